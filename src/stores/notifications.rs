use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::ids::generate_unique_id;
use crate::models::{Notification, NotificationKind};
use crate::persistence::{self, DynSnapshotStore, NOTIFICATION_PARTITION};

/// Persisted shape of the notification store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationState {
    /// Most recent first
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationState {
    fn count_unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// Ordered notification log with an unread counter.
///
/// `unread_count` always equals the number of unread notifications.
pub struct NotificationStore {
    state: NotificationState,
    snapshots: Option<DynSnapshotStore>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            state: NotificationState::default(),
            snapshots: None,
        }
    }

    /// Restore from the snapshot store and mirror every mutation back to it.
    pub fn with_snapshots(snapshots: DynSnapshotStore) -> Self {
        let mut state: NotificationState =
            persistence::restore_or(Some(&snapshots), NOTIFICATION_PARTITION, Default::default);

        let actual = state.count_unread();
        if state.unread_count != actual {
            tracing::warn!(
                "Restored unread count {} disagrees with log ({}), repairing",
                state.unread_count,
                actual
            );
            state.unread_count = actual;
        }

        Self {
            state,
            snapshots: Some(snapshots),
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.state.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.state.unread_count
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Prepend a new unread notification. Returns its id.
    pub fn add_notification(&mut self, kind: NotificationKind, message: impl Into<String>) -> String {
        let notification = Notification {
            id: generate_unique_id("notification"),
            kind,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        };
        let id = notification.id.clone();

        tracing::debug!("New {} notification {}", kind, id);
        self.state.notifications.insert(0, notification);
        self.state.unread_count += 1;
        self.commit();

        id
    }

    /// Mark one notification read. Marking an already-read one changes nothing.
    pub fn mark_as_read(&mut self, id: &str) -> StoreResult<()> {
        let notification = self
            .state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::NotificationNotFound(id.to_string()))?;

        if !notification.read {
            notification.read = true;
            self.state.unread_count = self.state.unread_count.saturating_sub(1);
            self.commit();
        }

        Ok(())
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in &mut self.state.notifications {
            notification.read = true;
        }
        self.state.unread_count = 0;
        self.commit();
    }

    pub fn clear_notifications(&mut self) {
        self.state.notifications.clear();
        self.state.unread_count = 0;
        self.commit();
    }

    fn commit(&self) {
        debug_assert_eq!(self.state.unread_count, self.state.count_unread());
        persistence::mirror(self.snapshots.as_ref(), NOTIFICATION_PARTITION, &self.state);
    }
}
