use crate::error::{StoreError, StoreResult};
use crate::models::{Comment, CommentUpdate, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

/// The content aggregate: posts with their embedded comments.
///
/// Posts are kept in insertion order. Not-found ids leave the store untouched
/// and are reported as errors.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Posts ordered by `created_at`, oldest first. Ties keep insertion order.
    pub fn chronological(&self) -> Vec<&Post> {
        let mut sorted: Vec<&Post> = self.posts.iter().collect();
        sorted.sort_by_key(|p| p.created_at);
        sorted
    }

    pub fn add_post(&mut self, post: Post) {
        tracing::debug!("Adding post {} by {}", post.id, post.username);
        self.posts.push(post);
    }

    pub fn like_post(&mut self, post_id: &str) -> StoreResult<()> {
        self.react(post_id, Reaction::Like)
    }

    pub fn dislike_post(&mut self, post_id: &str) -> StoreResult<()> {
        self.react(post_id, Reaction::Dislike)
    }

    /// Toggle a reaction. Setting one reaction clears the other and
    /// decrements its counter.
    pub fn react(&mut self, post_id: &str, reaction: Reaction) -> StoreResult<()> {
        let post = self.post_mut(post_id)?;

        let (active, count, other_active, other_count) = match reaction {
            Reaction::Like => (
                &mut post.liked,
                &mut post.likes,
                &mut post.disliked,
                &mut post.dislikes,
            ),
            Reaction::Dislike => (
                &mut post.disliked,
                &mut post.dislikes,
                &mut post.liked,
                &mut post.likes,
            ),
        };

        if *active {
            *active = false;
            *count = count.saturating_sub(1);
        } else {
            *active = true;
            *count += 1;
            if *other_active {
                *other_active = false;
                *other_count = other_count.saturating_sub(1);
            }
        }

        debug_assert!(!(post.liked && post.disliked));
        Ok(())
    }

    pub fn add_comment(&mut self, post_id: &str, comment: Comment) -> StoreResult<()> {
        let post = self.post_mut(post_id)?;
        tracing::debug!("Adding comment {} to post {}", comment.id, post_id);
        post.comments.push(comment);
        Ok(())
    }

    pub fn delete_comment(&mut self, post_id: &str, comment_id: &str) -> StoreResult<()> {
        let post = self.post_mut(post_id)?;
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);

        if post.comments.len() == before {
            return Err(StoreError::CommentNotFound {
                post_id: post_id.to_string(),
                comment_id: comment_id.to_string(),
            });
        }
        Ok(())
    }

    /// Merge `update` into the matching comment.
    pub fn update_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        update: CommentUpdate,
    ) -> StoreResult<()> {
        let post = self.post_mut(post_id)?;
        let comment = post
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| StoreError::CommentNotFound {
                post_id: post_id.to_string(),
                comment_id: comment_id.to_string(),
            })?;

        update.apply(comment);
        Ok(())
    }

    /// Remove the post and every comment it holds.
    pub fn delete_post(&mut self, post_id: &str) -> StoreResult<Post> {
        let index = self
            .posts
            .iter()
            .position(|p| p.id == post_id)
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))?;

        let removed = self.posts.remove(index);
        tracing::debug!(
            "Deleted post {} with {} comments",
            post_id,
            removed.comments.len()
        );
        Ok(removed)
    }

    fn post_mut(&mut self, post_id: &str) -> StoreResult<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))
    }
}
