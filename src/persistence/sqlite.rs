use rusqlite::params;

use crate::error::PersistError;
use crate::persistence::SnapshotStore;
use crate::state::DbPool;

/// SQLite implementation
pub struct SqliteSnapshotStore {
    pool: DbPool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, partition: &str) -> Result<Option<String>, PersistError> {
        let conn = self.pool.get()?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT body FROM snapshots WHERE partition = ?1",
            params![partition],
            |row| row.get(0),
        );

        match result {
            Ok(body) => Ok(Some(body)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, partition: &str, body: &str) -> Result<(), PersistError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO snapshots (partition, body, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(partition) DO UPDATE SET
               body = excluded.body,
               updated_at = excluded.updated_at",
            params![partition, body],
        )?;

        Ok(())
    }

    fn remove(&self, partition: &str) -> Result<bool, PersistError> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "DELETE FROM snapshots WHERE partition = ?1",
            params![partition],
        )?;

        Ok(rows > 0)
    }
}
