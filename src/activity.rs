use chrono::{DateTime, Utc};

use crate::models::Post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Post { likes: u32, comments: usize },
    Comment { post_id: String, likes: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Posts and comments written under `username`, newest first.
pub fn user_activity(posts: &[Post], username: &str) -> Vec<ActivityItem> {
    let authored = posts
        .iter()
        .filter(|p| p.username == username)
        .map(|p| ActivityItem {
            kind: ActivityKind::Post {
                likes: p.likes,
                comments: p.comments.len(),
            },
            content: p.content.clone(),
            timestamp: p.created_at,
        });

    let commented = posts.iter().flat_map(|p| {
        p.comments
            .iter()
            .filter(|c| c.username == username)
            .map(|c| ActivityItem {
                kind: ActivityKind::Comment {
                    post_id: p.id.clone(),
                    likes: c.likes.len(),
                },
                content: c.content.clone(),
                timestamp: c.created_at,
            })
    });

    let mut items: Vec<ActivityItem> = authored.chain(commented).collect();
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;
    use chrono::{Duration, TimeZone};

    #[test]
    fn merges_posts_and_comments_newest_first() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut mine = Post::new("p1", "ME0000001", "my post", None, t0);
        mine.likes = 2;
        let mut theirs = Post::new("p2", "OTH000002", "their post", None, t0 + Duration::minutes(1));
        theirs.comments.push(Comment {
            id: "c1".into(),
            user_id: "u-me".into(),
            username: "ME0000001".into(),
            content: "my reply".into(),
            created_at: t0 + Duration::minutes(2),
            likes: vec!["u-x".into()],
        });

        let items = user_activity(&[mine, theirs], "ME0000001");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "my reply");
        assert_eq!(
            items[0].kind,
            ActivityKind::Comment {
                post_id: "p2".into(),
                likes: 1
            }
        );
        assert_eq!(
            items[1].kind,
            ActivityKind::Post {
                likes: 2,
                comments: 0
            }
        );
    }

    #[test]
    fn nothing_for_strangers() {
        let post = Post::new("p1", "ME0000001", "x", None, Utc::now());
        assert!(user_activity(&[post], "NOBODY").is_empty());
    }
}
