use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::backend::{DynDocumentStore, DynIdentityService};
use crate::config::Config;
use crate::persistence::DynSnapshotStore;
use crate::stores::{AuthStore, HashtagStore, NotificationStore, PostStore};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Every store of one client session, owned by the application root.
pub struct AppState {
    pub config: Config,
    pub auth: AuthStore,
    pub posts: PostStore,
    pub notifications: NotificationStore,
    pub hashtags: HashtagStore,
}

impl AppState {
    /// Build the stores, restoring persisted partitions when `snapshots` is
    /// given. Posts always start empty.
    pub fn new(
        config: Config,
        identity: DynIdentityService,
        documents: DynDocumentStore,
        snapshots: Option<DynSnapshotStore>,
    ) -> Self {
        let (notifications, hashtags) = match &snapshots {
            Some(s) => (
                NotificationStore::with_snapshots(s.clone()),
                HashtagStore::with_snapshots(s.clone()),
            ),
            None => (NotificationStore::new(), HashtagStore::new()),
        };

        Self {
            config,
            auth: AuthStore::new(identity, documents, snapshots),
            posts: PostStore::new(),
            notifications,
            hashtags,
        }
    }
}
