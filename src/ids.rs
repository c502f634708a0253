use rand::Rng;

const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 8;

/// Generate a unique id of the form `<millis>-<8 base36 chars>`,
/// optionally prefixed with `<prefix>-`.
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    if prefix.is_empty() {
        format!("{}-{}", timestamp, suffix)
    } else {
        format!("{}-{}-{}", prefix, timestamp, suffix)
    }
}

/// Id for a top-level entity (posts). Time-ordered.
pub fn generate_entity_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_id_has_three_parts() {
        let id = generate_unique_id("comment");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "comment");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn bare_id_has_no_prefix() {
        let id = generate_unique_id("");
        assert_eq!(id.split('-').count(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_unique_id("n");
        let b = generate_unique_id("n");
        assert_ne!(a, b);
    }
}
