// Library exports for campus-social
// The binary and the integration tests both build on these modules

pub mod activity;
pub mod backend;
pub mod comment_likes;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod intents;
pub mod messages;
pub mod models;
pub mod persistence;
pub mod polls;
pub mod share;
pub mod state;
pub mod stores;
pub mod validation;

pub use error::{AppError, AppResult};
pub use state::AppState;
