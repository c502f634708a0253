pub mod auth;
pub mod hashtags;
pub mod notifications;
pub mod posts;

pub use auth::{derive_username, AuthSession, AuthStatus, AuthStore, AuthView};
pub use hashtags::{extract_hashtags, normalize_hashtag, HashtagState, HashtagStore};
pub use notifications::{NotificationState, NotificationStore};
pub use posts::{PostStore, Reaction};
