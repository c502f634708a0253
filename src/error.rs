#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Comment {comment_id} not found on post {post_id}")]
    CommentNotFound { post_id: String, comment_id: String },

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Hashtag not found: {0}")]
    HashtagNotFound(String),

    #[error("Only the author can do that")]
    NotAuthor,

    #[error("You need to be signed in")]
    NotAuthenticated,
}

/// Failures reported by the identity and document services.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("email already in use")]
    EmailInUse,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired action code")]
    InvalidCode,

    #[error("no such account")]
    UserNotFound,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("document store error: {0}")]
    Document(String),

    #[error("backend initialization failed after {attempts} attempts")]
    InitFailed { attempts: u32 },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please verify your email first. A new verification email has been sent.")]
    EmailNotVerified,

    #[error("Invalid or expired verification code")]
    InvalidCode,

    #[error("An account with this email already exists")]
    EmailInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User data not found")]
    UserDataNotFound,

    #[error("No user found")]
    NoCurrentUser,

    #[error("{0}")]
    Remote(String),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::EmailInUse => AuthError::EmailInUse,
            BackendError::InvalidCredentials | BackendError::UserNotFound => {
                AuthError::InvalidCredentials
            }
            BackendError::InvalidCode => AuthError::InvalidCode,
            BackendError::Unavailable(_) => AuthError::Remote(
                "Network error. Please check your connection and try again.".to_string(),
            ),
            BackendError::Document(_) | BackendError::InitFailed { .. } => {
                AuthError::Remote("Something went wrong. Please try again later.".to_string())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please use your @{0} email address")]
    EmailDomain(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Post cannot be empty")]
    EmptyPost,

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Poll question cannot be empty")]
    EmptyPollQuestion,

    #[error("Poll needs between {min} and {max} options")]
    PollOptionCount { min: usize, max: usize },

    #[error("Poll options cannot be empty")]
    EmptyPollOption,

    #[error("Hashtag cannot be empty")]
    EmptyHashtag,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type AppResult<T> = Result<T, AppError>;
pub type StoreResult<T> = Result<T, StoreError>;
