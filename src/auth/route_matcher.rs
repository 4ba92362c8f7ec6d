//! Decides which request paths need a signed in user.

/// Paths that need a signed in user.
///
/// A pattern ending in `(.*)` matches any path that starts with the text
/// before it. Any other pattern matches only that exact path.
pub const PROTECTED_ROUTES: [&str; 8] = [
    "/dashboard(.*)",
    "/manage(.*)",
    "/transactions(.*)",
    "/api/transactions(.*)",
    "/api/categories(.*)",
    "/api/overview(.*)",
    "/api/history(.*)",
    "/api/settings(.*)",
];

const WILDCARD_SUFFIX: &str = "(.*)";

#[derive(Debug, Clone, PartialEq)]
enum Pattern {
    Exact(String),
    Prefix(String),
}

/// Matches request paths against a list of route patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatcher {
    patterns: Vec<Pattern>,
}

impl RouteMatcher {
    /// Build a matcher from patterns such as `"/dashboard(.*)"` or `"/"`.
    pub fn new(patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .map(|pattern| match pattern.strip_suffix(WILDCARD_SUFFIX) {
                Some(prefix) => Pattern::Prefix(prefix.to_owned()),
                None => Pattern::Exact((*pattern).to_owned()),
            })
            .collect();

        Self { patterns }
    }

    /// Whether any pattern matches `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Exact(exact) => path == exact,
            Pattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        })
    }
}

impl Default for RouteMatcher {
    /// The matcher for [PROTECTED_ROUTES].
    fn default() -> Self {
        Self::new(&PROTECTED_ROUTES)
    }
}

#[cfg(test)]
mod route_matcher_tests {
    use super::RouteMatcher;

    #[test]
    fn wildcard_matches_prefix() {
        let matcher = RouteMatcher::default();

        assert!(matcher.is_match("/dashboard"));
        assert!(matcher.is_match("/transactions?from=2025-01-01"));
        assert!(matcher.is_match("/api/transactions/42"));
        assert!(matcher.is_match("/api/categories/picker"));
    }

    #[test]
    fn unprotected_paths_do_not_match() {
        let matcher = RouteMatcher::default();

        for path in ["/", "/sign-in", "/sign-up", "/api/sign-in", "/api/users", "/static/main.css"] {
            assert!(!matcher.is_match(path), "{path} should not be protected");
        }
    }

    #[test]
    fn pattern_without_wildcard_matches_exactly() {
        let matcher = RouteMatcher::new(&["/exact"]);

        assert!(matcher.is_match("/exact"));
        assert!(!matcher.is_match("/exact/more"));
        assert!(!matcher.is_match("/exac"));
    }
}
