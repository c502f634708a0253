// UI intents translated into store mutations and their side effects
use chrono::Utc;

use crate::activity::{self, ActivityItem};
use crate::comment_likes::{self, LikeAction};
use crate::error::{AppResult, StoreError, ValidationError};
use crate::ids::{generate_entity_id, generate_unique_id};
use crate::messages;
use crate::models::{Comment, CommentUpdate, NotificationKind, Post, User};
use crate::polls::Poll;
use crate::state::AppState;
use crate::stores::{extract_hashtags, normalize_hashtag, Reaction};

const ANONYMOUS: &str = "Anonymous";

impl AppState {
    /// The current user, only once their email is verified.
    fn session_user(&self) -> Option<User> {
        if self.auth.is_authenticated() {
            self.auth.current_user()
        } else {
            None
        }
    }

    fn require_user(&self) -> Result<User, StoreError> {
        self.session_user().ok_or(StoreError::NotAuthenticated)
    }

    /// Publish a post under the current handle. Known trending hashtags in
    /// the body get their counts bumped. Returns the new post id.
    pub fn create_post(
        &mut self,
        content: &str,
        image: Option<String>,
        poll: Option<&Poll>,
    ) -> AppResult<String> {
        let content = content.trim();
        if content.is_empty() && image.is_none() && poll.is_none() {
            return Err(ValidationError::EmptyPost.into());
        }

        let body = match poll {
            Some(poll) => poll.render_into(content),
            None => content.to_string(),
        };
        let username = self
            .session_user()
            .map(|u| u.username)
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let post = Post::new(generate_entity_id(), username, body, image, Utc::now());
        let id = post.id.clone();

        for tag in extract_hashtags(&post.content) {
            if self.hashtags.increment_hashtag_count(&tag).is_err() {
                tracing::debug!("{} is not trending, count unchanged", tag);
            }
        }

        self.posts.add_post(post);
        tracing::info!("Created post {}", id);
        Ok(id)
    }

    pub fn react_to_post(&mut self, post_id: &str, reaction: Reaction) -> AppResult<()> {
        self.posts.react(post_id, reaction)?;
        Ok(())
    }

    /// Comment as the current user. The post author is notified unless they
    /// are commenting on their own post. Returns the new comment id.
    pub fn comment_on_post(&mut self, post_id: &str, content: &str) -> AppResult<String> {
        let user = self.require_user()?;
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyComment.into());
        }

        let comment = Comment {
            id: generate_unique_id("comment"),
            user_id: user.id.clone(),
            username: user.username.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
            likes: Vec::new(),
        };
        let id = comment.id.clone();
        self.posts.add_comment(post_id, comment)?;

        let own_post = self
            .posts
            .get(post_id)
            .is_some_and(|p| p.username == user.username);
        if !own_post {
            self.notifications.add_notification(
                NotificationKind::Comment,
                messages::post_commented(&user.username, content),
            );
        }

        Ok(id)
    }

    pub fn toggle_comment_like(
        &mut self,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<LikeAction>> {
        let comment = self
            .posts
            .get(post_id)
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))?
            .comment(comment_id)
            .cloned()
            .ok_or_else(|| StoreError::CommentNotFound {
                post_id: post_id.to_string(),
                comment_id: comment_id.to_string(),
            })?;
        let user = self.session_user();

        let mut new_likes = None;
        let action = comment_likes::toggle_like(
            &comment,
            user.as_ref(),
            &mut self.notifications,
            |likes| new_likes = Some(likes),
        );

        if let Some(likes) = new_likes {
            self.posts
                .update_comment(post_id, comment_id, CommentUpdate::likes(likes))?;
        }
        Ok(action)
    }

    /// Only the comment's author may delete it.
    pub fn delete_comment(&mut self, post_id: &str, comment_id: &str) -> AppResult<()> {
        let user = self.require_user()?;
        let author = self
            .posts
            .get(post_id)
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))?
            .comment(comment_id)
            .map(|c| c.user_id.clone())
            .ok_or_else(|| StoreError::CommentNotFound {
                post_id: post_id.to_string(),
                comment_id: comment_id.to_string(),
            })?;

        if author != user.id {
            return Err(StoreError::NotAuthor.into());
        }
        self.posts.delete_comment(post_id, comment_id)?;
        Ok(())
    }

    /// Only the post's author may delete it. Returns the removed post.
    pub fn delete_post(&mut self, post_id: &str) -> AppResult<Post> {
        let user = self.require_user()?;
        let author = self
            .posts
            .get(post_id)
            .map(|p| p.username.clone())
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))?;

        if author != user.username {
            return Err(StoreError::NotAuthor.into());
        }
        let removed = self.posts.delete_post(post_id)?;
        tracing::info!("Deleted post {}", post_id);
        Ok(removed)
    }

    /// Append a mention of `username` to the draft and notify the mentioned user.
    pub fn tag_user(&mut self, content: &str, username: &str) -> String {
        self.notifications
            .add_notification(NotificationKind::Mention, messages::mentioned());
        format!("{} @{} ", content, username)
    }

    /// Normalize and remember a hashtag typed into the picker.
    pub fn add_custom_hashtag(&mut self, raw: &str) -> AppResult<String> {
        let tag = normalize_hashtag(raw)?;
        self.hashtags.add_custom_hashtag(tag.clone());
        Ok(tag)
    }

    /// Display order of the feed, oldest first.
    pub fn feed(&self) -> Vec<&Post> {
        self.posts.chronological()
    }

    /// The current user's posts and comments, newest first.
    pub fn activity(&self) -> Vec<ActivityItem> {
        match self.session_user() {
            Some(user) => activity::user_activity(self.posts.posts(), &user.username),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::simulated::EmailKind;
    use crate::backend::{MemoryDocumentStore, SimulatedBackend};
    use crate::config::Config;
    use crate::error::AppError;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> (AppState, Arc<SimulatedBackend>) {
        let backend = Arc::new(SimulatedBackend::new(Duration::ZERO).with_hash_cost(4));
        let state = AppState::new(
            Config::default(),
            backend.clone(),
            Arc::new(MemoryDocumentStore::new()),
            None,
        );
        (state, backend)
    }

    async fn signed_in(email: &str) -> (AppState, Arc<SimulatedBackend>) {
        let (state, backend) = app();
        state.auth.register(email, "secret1").await.unwrap();
        let code = backend
            .latest_code(email, EmailKind::Verification)
            .await
            .unwrap();
        state.auth.verify_email(&code).await.unwrap();
        (state, backend)
    }

    #[test]
    fn anonymous_post_and_empty_rejection() {
        let (mut state, _) = app();
        let id = state.create_post("  hello  ", None, None).unwrap();

        let post = state.posts.get(&id).unwrap();
        assert_eq!(post.username, "Anonymous");
        assert_eq!(post.content, "hello");

        assert!(matches!(
            state.create_post("   ", None, None),
            Err(AppError::Validation(ValidationError::EmptyPost))
        ));
        assert!(state
            .create_post("", Some("data:image/png;base64,AAAA".into()), None)
            .is_ok());
    }

    #[test]
    fn post_with_poll_renders_block() {
        let (mut state, _) = app();
        let poll = Poll::new("Tea or coffee?", vec!["Tea".into(), "Coffee".into()], 24).unwrap();
        let id = state.create_post("", None, Some(&poll)).unwrap();
        assert!(state.posts.get(&id).unwrap().content.contains("Poll: Tea or coffee?"));
    }

    #[test]
    fn trending_tags_in_post_are_counted() {
        let (mut state, _) = app();
        state.create_post("See you at #KRCT and #Unknown", None, None).unwrap();

        let krct = state
            .hashtags
            .trending()
            .iter()
            .find(|h| h.tag == "#KRCT")
            .unwrap();
        assert_eq!(krct.count, 246);
    }

    #[test]
    fn commenting_requires_a_session() {
        let (mut state, _) = app();
        let id = state.create_post("hello", None, None).unwrap();
        assert!(matches!(
            state.comment_on_post(&id, "hi"),
            Err(AppError::Store(StoreError::NotAuthenticated))
        ));
    }

    #[tokio::test]
    async fn unverified_account_is_treated_as_signed_out() {
        let (mut state, _) = app();
        state.auth.register("abc@krct.ac.in", "secret1").await.unwrap();
        assert!(state.auth.current_user().is_some());
        assert!(!state.auth.is_authenticated());

        let id = state.create_post("hello", None, None).unwrap();
        assert_eq!(state.posts.get(&id).unwrap().username, "Anonymous");

        assert!(matches!(
            state.comment_on_post(&id, "hi"),
            Err(AppError::Store(StoreError::NotAuthenticated))
        ));
        assert!(matches!(
            state.delete_post(&id),
            Err(AppError::Store(StoreError::NotAuthenticated))
        ));
        assert!(state.activity().is_empty());
    }

    #[tokio::test]
    async fn comment_notifies_post_author() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let post = Post::new("p1", "XYZ000001", "hello", None, Utc::now());
        state.posts.add_post(post);

        let comment_id = state.comment_on_post("p1", "hi there").unwrap();
        assert!(comment_id.starts_with("comment-"));
        assert_eq!(state.notifications.unread_count(), 1);
        assert_eq!(
            state.notifications.notifications()[0].kind,
            NotificationKind::Comment
        );
    }

    #[tokio::test]
    async fn commenting_on_own_post_is_silent() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let id = state.create_post("mine", None, None).unwrap();
        state.comment_on_post(&id, "me again").unwrap();
        assert_eq!(state.notifications.unread_count(), 0);
    }

    #[tokio::test]
    async fn comment_like_toggles_through_store() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let user_id = state.auth.current_user().unwrap().id;
        let mut post = Post::new("p1", "XYZ000001", "hello", None, Utc::now());
        post.comments.push(Comment {
            id: "c1".into(),
            user_id: "someone-else".into(),
            username: "XYZ000001".into(),
            content: "first".into(),
            created_at: Utc::now(),
            likes: vec![],
        });
        state.posts.add_post(post);

        let action = state.toggle_comment_like("p1", "c1").unwrap();
        assert_eq!(action, Some(LikeAction::Liked));
        assert_eq!(
            state.posts.get("p1").unwrap().comment("c1").unwrap().likes,
            vec![user_id]
        );
        assert_eq!(state.notifications.unread_count(), 1);

        let action = state.toggle_comment_like("p1", "c1").unwrap();
        assert_eq!(action, Some(LikeAction::Unliked));
        assert!(state.posts.get("p1").unwrap().comment("c1").unwrap().likes.is_empty());
        assert_eq!(state.notifications.unread_count(), 1);
    }

    #[tokio::test]
    async fn only_author_deletes_comment() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let id = state.create_post("hello", None, None).unwrap();
        let mine = state.comment_on_post(&id, "mine").unwrap();
        state
            .posts
            .add_comment(
                &id,
                Comment {
                    id: "theirs".into(),
                    user_id: "other".into(),
                    username: "OTH000001".into(),
                    content: "theirs".into(),
                    created_at: Utc::now(),
                    likes: vec![],
                },
            )
            .unwrap();

        assert!(matches!(
            state.delete_comment(&id, "theirs"),
            Err(AppError::Store(StoreError::NotAuthor))
        ));
        state.delete_comment(&id, &mine).unwrap();
        assert_eq!(state.posts.get(&id).unwrap().comments.len(), 1);
    }

    #[tokio::test]
    async fn only_author_deletes_post() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let mine = state.create_post("mine", None, None).unwrap();
        state
            .posts
            .add_post(Post::new("theirs", "XYZ000001", "theirs", None, Utc::now()));

        assert!(matches!(
            state.delete_post("theirs"),
            Err(AppError::Store(StoreError::NotAuthor))
        ));
        assert!(state.posts.get("theirs").is_some());

        let removed = state.delete_post(&mine).unwrap();
        assert_eq!(removed.content, "mine");
        assert!(state.posts.get(&mine).is_none());

        assert!(matches!(
            state.delete_post(&mine),
            Err(AppError::Store(StoreError::PostNotFound(_)))
        ));
    }

    #[test]
    fn tagging_appends_mention_and_notifies() {
        let (mut state, _) = app();
        let draft = state.tag_user("hey", "ABC123456");
        assert_eq!(draft, "hey @ABC123456 ");
        assert_eq!(
            state.notifications.notifications()[0].message,
            "You were mentioned in a post"
        );
    }

    #[test]
    fn custom_hashtag_is_normalized() {
        let (mut state, _) = app();
        assert_eq!(state.add_custom_hashtag("exam prep").unwrap(), "#examprep");
        state.add_custom_hashtag("#examprep").unwrap();
        assert_eq!(state.hashtags.custom(), &["#examprep".to_string()]);
    }

    #[tokio::test]
    async fn activity_lists_own_content() {
        let (mut state, _) = signed_in("abc@krct.ac.in").await;
        let id = state.create_post("first", None, None).unwrap();
        state.comment_on_post(&id, "reply").unwrap();
        state.react_to_post(&id, Reaction::Like).unwrap();

        let items = state.activity();
        assert_eq!(items.len(), 2);
        assert_eq!(state.feed().len(), 1);
    }
}
