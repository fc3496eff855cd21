//! URL prefix rewriting rules.

use serde::{Deserialize, Serialize};

/// Replaces a textual URL prefix with another one.
///
/// Rules hold no state between requests and can be shared freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Prefix to look for
    pub match_prefix: String,
    /// Text that replaces the prefix
    pub replace: String,
}

impl RewriteRule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(match_prefix: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            match_prefix: match_prefix.into(),
            replace: replace.into(),
        }
    }

    /// Returns the rewritten URL, or `None` if `url` does not start with the
    /// match prefix.
    #[must_use]
    pub fn apply(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.match_prefix)
            .map(|rest| format!("{}{rest}", self.replace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_matching_prefix() {
        let rule = RewriteRule::new("http://example.com", "http://127.0.0.1:8080");
        assert_eq!(
            rule.apply("http://example.com/path?q=1"),
            Some("http://127.0.0.1:8080/path?q=1".to_string())
        );
    }

    #[test]
    fn test_apply_non_matching() {
        let rule = RewriteRule::new("http://example.com", "http://127.0.0.1:8080");
        assert_eq!(rule.apply("http://other.com/path"), None);
    }

    #[test]
    fn test_rule_is_reusable() {
        let rule = RewriteRule::new("https://api.", "http://localhost/");
        assert_eq!(rule.apply("https://api.a"), Some("http://localhost/a".to_string()));
        assert_eq!(rule.apply("https://api.b"), Some("http://localhost/b".to_string()));
    }
}
