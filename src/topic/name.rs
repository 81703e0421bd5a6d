use std::sync::LazyLock;

use regex::Regex;

/// Prefix carried by every canonical topic.
pub const TOPIC_PREFIX: &str = "/topics/";

static TOPIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/topics/[a-zA-Z0-9\-_.~%]+$").expect("topic pattern is a valid regex")
});

/// Returns `topic` in canonical form, adding the `/topics/` prefix when it is
/// missing.
pub fn normalize(topic: &str) -> String {
    if topic.starts_with(TOPIC_PREFIX) {
        topic.to_string()
    } else {
        format!("{TOPIC_PREFIX}{topic}")
    }
}

/// Checks that `topic` is exactly the prefix followed by one or more
/// characters from `[A-Za-z0-9-_.~%]`.
pub fn is_valid(topic: &str) -> bool {
    TOPIC_PATTERN.is_match(topic)
}
