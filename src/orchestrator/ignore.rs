// src/orchestrator/ignore.rs
// =============================================================================
// Ignore rules as a plain predicate.
//
// The orchestrator only ever asks "should this URI be skipped?", so any
// matcher can be plugged in. The default one compiles glob patterns.
// =============================================================================

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::sync::Arc;

pub type IgnorePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// `*` stops at `/` and `**` crosses it. With `dot` off, a wildcard never
// matches a leading `.` in a path segment.
pub fn glob_predicate(patterns: &[String], dot: bool) -> Result<IgnorePredicate> {
    if patterns.is_empty() {
        return Ok(ignore_nothing());
    }

    let compiled = patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| Error::IgnorePattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: !dot,
    };

    Ok(Arc::new(move |uri: &str| {
        compiled
            .iter()
            .any(|pattern| pattern.matches_with(uri, options))
    }))
}

pub fn ignore_nothing() -> IgnorePredicate {
    Arc::new(|_: &str| false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_matches_host_wildcard() {
        let ignore = glob_predicate(&patterns(&["https://localhost*/**"]), false).unwrap();
        assert!(ignore("https://localhost:8080/a/b"));
        assert!(!ignore("https://example.com/a"));
    }

    #[test]
    fn test_star_stops_at_slash() {
        let ignore = glob_predicate(&patterns(&["https://example.com/*"]), false).unwrap();
        assert!(ignore("https://example.com/a"));
        assert!(!ignore("https://example.com/a/b"));
    }

    #[test]
    fn test_dot_mode() {
        let list = patterns(&["docs/*"]);
        let strict = glob_predicate(&list, false).unwrap();
        let dotted = glob_predicate(&list, true).unwrap();

        assert!(!strict("docs/.hidden"));
        assert!(dotted("docs/.hidden"));
        assert!(strict("docs/visible"));
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        let result = glob_predicate(&patterns(&["docs/a**b"]), false);
        assert!(matches!(result, Err(Error::IgnorePattern { .. })));
    }

    #[test]
    fn test_no_patterns_ignores_nothing() {
        let ignore = glob_predicate(&[], false).unwrap();
        assert!(!ignore("https://example.com"));
        assert!(!ignore(""));
    }
}
