use super::{is_valid, normalize};

#[test]
fn test_normalize_keeps_prefixed_topic() {
    assert_eq!(normalize("/topics/news"), "/topics/news");
    assert_eq!(normalize(&normalize("/topics/news")), "/topics/news");
}

#[test]
fn test_normalize_adds_prefix() {
    assert_eq!(normalize("news"), "/topics/news");
    assert_eq!(normalize("topics/news"), "/topics/topics/news");
}

#[test]
fn test_is_valid_accepts_allowed_characters() {
    assert!(is_valid("/topics/foo-bar.1_2%3"));
    assert!(is_valid("/topics/~tilde"));
}

#[test]
fn test_is_valid_rejects_malformed_topics() {
    assert!(!is_valid("/topics/foo bar"));
    assert!(!is_valid("topics/foo"));
    assert!(!is_valid("/topics/"));
    assert!(!is_valid("/topics/foo/bar"));
    assert!(!is_valid(" /topics/foo"));
    assert!(!is_valid("/topics/foo\n"));
    assert!(!is_valid(""));
}
