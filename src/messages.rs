//! Preformatted notification messages.

const EXCERPT_CHARS: usize = 30;

/// First 30 characters of `content`, with `...` appended when truncated.
pub fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub fn comment_liked(actor: &str, comment: &str) -> String {
    format!("{} liked your comment: \"{}\"", actor, excerpt(comment))
}

pub fn post_commented(actor: &str, comment: &str) -> String {
    format!("{} commented on your post: \"{}\"", actor, excerpt(comment))
}

pub fn mentioned() -> String {
    "You were mentioned in a post".to_string()
}
