use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The signed-in identity. Owned by the auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    /// Author handle, denormalized
    pub username: String,
    pub content: String,
    /// Inline data URI
    #[serde(default)]
    pub image: Option<String>,
    pub likes: u32,
    pub dislikes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Viewer-local reaction flags; not keyed by user.
    pub liked: bool,
    pub disliked: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// A fresh post with no reactions or comments.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        content: impl Into<String>,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            content: content.into(),
            image,
            likes: 0,
            dislikes: 0,
            comments: Vec::new(),
            liked: false,
            disliked: false,
            created_at,
        }
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Ids of users who liked the comment, no duplicates
    #[serde(default)]
    pub likes: Vec<String>,
}

/// Partial update merged into an existing comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentUpdate {
    pub content: Option<String>,
    pub likes: Option<Vec<String>>,
}

impl CommentUpdate {
    pub fn likes(likes: Vec<String>) -> Self {
        Self {
            likes: Some(likes),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, comment: &mut Comment) {
        if let Some(content) = self.content {
            comment.content = content;
        }
        if let Some(likes) = self.likes {
            let mut unique = Vec::with_capacity(likes.len());
            for id in likes {
                if !unique.contains(&id) {
                    unique.push(id);
                }
            }
            comment.likes = unique;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Mention,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Comment => write!(f, "comment"),
            Self::Mention => write!(f, "mention"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    pub tag: String,
    pub count: u32,
    pub is_rising: bool,
}

impl Hashtag {
    pub fn new(tag: impl Into<String>, count: u32, is_rising: bool) -> Self {
        Self {
            tag: tag.into(),
            count,
            is_rising,
        }
    }
}
