//! Wildcard key matching
//!
//! `*` matches any substring, including the empty one; matching is anchored
//! at both ends of the key. Any number of stars is supported.

/// Check if a key matches a glob pattern.
///
/// Without a `*` the match is exact. Otherwise the first fixed segment is
/// anchored at the start, the last at the end, and segments in between are
/// matched leftmost, in order.
pub(crate) fn matches_pattern(key: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return key == pattern;
    }

    // A pattern with a star splits into at least two segments
    let segments: Vec<&str> = pattern.split('*').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];
    let middle = &segments[1..segments.len() - 1];

    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all() {
        assert!(matches_pattern("anything", "*"));
        assert!(matches_pattern("", "*"));
    }

    #[test]
    fn test_exact() {
        assert!(matches_pattern("exact_key", "exact_key"));
        assert!(!matches_pattern("exact_key2", "exact_key"));
    }

    #[test]
    fn test_prefix() {
        assert!(matches_pattern("user:1", "user:*"));
        assert!(matches_pattern("user:", "user:*"));
        assert!(!matches_pattern("session:1", "user:*"));
    }

    #[test]
    fn test_suffix() {
        assert!(matches_pattern("data:cache", "*:cache"));
        assert!(!matches_pattern("data:main", "*:cache"));
    }

    #[test]
    fn test_contains() {
        assert!(matches_pattern("user_admin", "*admin*"));
        assert!(matches_pattern("admin_role", "*admin*"));
        assert!(!matches_pattern("role_user", "*admin*"));
    }

    #[test]
    fn test_mid_pattern_star() {
        assert!(matches_pattern("user:42:name", "user:*:name"));
        assert!(!matches_pattern("user:42:nickname", "user:*:name"));
        assert!(matches_pattern("user::name", "user:*:name"));
    }

    #[test]
    fn test_multiple_stars() {
        assert!(matches_pattern("a:b:c:d", "a:*:c:*"));
        assert!(matches_pattern("abc", "a*b*c"));
        assert!(!matches_pattern("acb", "a*b*c"));
    }

    #[test]
    fn test_star_matches_empty() {
        assert!(matches_pattern("ac", "a*c"));
        assert!(matches_pattern("abb", "*ab*b"));
    }

    #[test]
    fn test_overlapping_segments() {
        assert!(matches_pattern("bbb", "*bb*b"));
        assert!(!matches_pattern("bb", "*bb*b"));
    }
}
