use crate::messages;
use crate::models::{Comment, NotificationKind, User};
use crate::stores::NotificationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Whether `user` is in the comment's like list. No user, no like.
pub fn is_liked_by_user(likes: &[String], user: Option<&User>) -> bool {
    user.is_some_and(|u| likes.iter().any(|id| *id == u.id))
}

/// Add or remove `actor` from the comment's likes and hand the new list to
/// `on_update`. Liking someone else's comment raises a like notification.
///
/// Returns `None` without calling `on_update` when there is no actor.
pub fn toggle_like<F>(
    comment: &Comment,
    actor: Option<&User>,
    notifications: &mut NotificationStore,
    on_update: F,
) -> Option<LikeAction>
where
    F: FnOnce(Vec<String>),
{
    let actor = actor?;

    let already_liked = comment.likes.iter().any(|id| *id == actor.id);
    let new_likes: Vec<String> = if already_liked {
        comment
            .likes
            .iter()
            .filter(|id| **id != actor.id)
            .cloned()
            .collect()
    } else {
        let mut likes = comment.likes.clone();
        likes.push(actor.id.clone());
        likes
    };

    if !already_liked && comment.user_id != actor.id {
        notifications.add_notification(
            NotificationKind::Like,
            messages::comment_liked(&actor.username, &comment.content),
        );
    }

    on_update(new_likes);

    Some(if already_liked {
        LikeAction::Unliked
    } else {
        LikeAction::Liked
    })
}
