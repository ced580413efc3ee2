//! Glob-style path matcher backing `robots.txt` `Disallow:` rules and CLI
//! `--disallow` arguments (§4.2).
//!
//! Grounded on `crul/traverse.py::DisallowedSet` (strip leading `/`, append `*`,
//! `fnmatch` against each pattern in turn, first match wins).

/// An ordered set of disallow patterns. Construction takes raw `Disallow:` paths plus
/// user-supplied `--disallow` arguments; order doesn't affect the result (first match
/// wins, but any match wins), only construction cost.
#[derive(Debug, Clone, Default)]
pub struct DisallowMatcher {
    patterns: Vec<String>,
}

impl DisallowMatcher {
    /// Build a matcher from raw paths. Each is normalized by stripping a leading `/`
    /// and appending `*`. An empty iterator yields a matcher that disallows nothing.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| format!("{}*", p.as_ref().trim_start_matches('/')))
            .collect();
        Self { patterns }
    }

    /// True iff `path` matches any configured pattern, after stripping its leading `/`.
    pub fn is_disallowed(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.patterns.iter().any(|pattern| glob_match(pattern, path))
    }
}

/// Minimal `fnmatch`-equivalent glob matcher supporting `*` (any run of characters,
/// including empty) and `?` (exactly one character). Sufficient for the single-trailing-
/// wildcard patterns `DisallowMatcher` constructs, and for any literal wildcards a caller
/// passes in via `--disallow`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, 0, &text, 0)
}

fn match_from(pattern: &[char], pi: usize, text: &[char], ti: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }
    match pattern[pi] {
        '*' => {
            // Try consuming zero or more characters of text for this '*'.
            for skip in 0..=(text.len() - ti) {
                if match_from(pattern, pi + 1, text, ti + skip) {
                    return true;
                }
            }
            false
        }
        '?' => ti < text.len() && match_from(pattern, pi + 1, text, ti + 1),
        c => ti < text.len() && text[ti] == c && match_from(pattern, pi + 1, text, ti + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_matches_nothing() {
        let d = DisallowMatcher::new(Vec::<&str>::new());
        assert!(!d.is_disallowed("/"));
        assert!(!d.is_disallowed("/test"));
    }

    #[test]
    fn exact_path_matches() {
        let d = DisallowMatcher::new(["/private"]);
        assert!(d.is_disallowed("/private"));
    }

    #[test]
    fn prefix_glob_matches_longer_path() {
        let d = DisallowMatcher::new(["/private"]);
        assert!(d.is_disallowed("/private-files"));
        assert!(d.is_disallowed("/private/calendar"));
    }

    #[test]
    fn leading_slash_is_irrelevant_on_query_side() {
        let d = DisallowMatcher::new(["/private"]);
        assert!(d.is_disallowed("private"));
    }

    #[test]
    fn unrelated_path_does_not_match() {
        let d = DisallowMatcher::new(["/private"]);
        assert!(!d.is_disallowed("/public"));
    }
}
