use async_trait::async_trait;
use rusqlite::params;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::backend::{merge_documents, DocumentStore};
use crate::error::BackendError;
use crate::state::DbPool;

fn storage_error(e: impl std::fmt::Display) -> BackendError {
    BackendError::Document(e.to_string())
}

/// Document store backed by the local SQLite database.
pub struct SqliteDocumentStore {
    pool: DbPool,
}

impl SqliteDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError> {
        let conn = self.pool.get().map_err(storage_error)?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        );

        match result {
            Ok(body) => Ok(Some(serde_json::from_str(&body).map_err(storage_error)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError> {
        self.load(collection, id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        merge: bool,
    ) -> Result<(), BackendError> {
        let doc = match (merge, self.load(collection, id)?) {
            (true, Some(existing)) => merge_documents(existing, doc),
            _ => doc,
        };
        let body = serde_json::to_string(&doc).map_err(storage_error)?;

        let conn = self.pool.get().map_err(storage_error)?;
        conn.execute(
            "INSERT INTO documents (collection, id, body, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(collection, id) DO UPDATE SET
               body = excluded.body,
               updated_at = excluded.updated_at",
            params![collection, id, body],
        )
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError> {
        let conn = self.pool.get().map_err(storage_error)?;
        let rows = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .map_err(storage_error)?;
        Ok(rows > 0)
    }
}

/// In-memory document store for tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError> {
        let docs = self.docs.lock().await;
        Ok(docs.get(&(collection.to_string(), id.to_string())).cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        merge: bool,
    ) -> Result<(), BackendError> {
        let mut docs = self.docs.lock().await;
        let key = (collection.to_string(), id.to_string());
        let doc = match (merge, docs.remove(&key)) {
            (true, Some(existing)) => merge_documents(existing, doc),
            _ => doc,
        };
        docs.insert(key, doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError> {
        let mut docs = self.docs.lock().await;
        Ok(docs
            .remove(&(collection.to_string(), id.to_string()))
            .is_some())
    }
}
