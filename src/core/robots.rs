//! `robots.txt` interpretation: global `Disallow:` extraction and `Crawl-Delay:`
//! parsing, deliberately ignoring `User-agent:` grouping and `Allow:` (§4.3, §9).
//!
//! Grounded on `crul/__main__.py::parse_disallowed`/`parse_crawl_delay`, translated
//! regex-for-regex.

use regex::Regex;
use std::sync::OnceLock;

fn disallow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?mi)^Disallow:\s*(\S+)").expect("valid regex"))
}

fn crawl_delay_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?mi)^\s*Crawl-Delay:\s*([\d.]+)").expect("valid regex"))
}

/// The policy distilled from a `robots.txt` body: every `Disallow:` path found anywhere
/// in the document, and the first `Crawl-Delay:` value (0 if absent or unparseable).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsPolicy {
    pub disallow: Vec<String>,
    pub crawl_delay: f64,
}

impl RobotsPolicy {
    /// Parse a `robots.txt` body. The `user_agent` parameter is accepted to document the
    /// interface's intent but is intentionally unused: this implementation does not take
    /// `User-agent:` grouping into account (§4.3).
    pub fn parse(body: &str, _user_agent: &str) -> Self {
        Self {
            disallow: parse_disallowed(body),
            crawl_delay: parse_crawl_delay(body),
        }
    }
}

/// Extract every `Disallow:` path, case-insensitive, across the whole document.
pub fn parse_disallowed(body: &str) -> Vec<String> {
    disallow_re()
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// Extract the first `Crawl-Delay:` numeric value. A missing or unparseable delay, or a
/// negative one, yields 0.
pub fn parse_crawl_delay(body: &str) -> f64 {
    crawl_delay_re()
        .captures(body)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|d| if d < 0.0 { 0.0 } else { d })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_delay_defaults_to_zero() {
        let body = "User-agent: *\nDisallow: /private\nDisallow: /random\n";
        assert_eq!(parse_crawl_delay(body), 0.0);
    }

    #[test]
    fn integer_delay() {
        let body = "User-agent: *\nDisallow: /private\nCrawl-delay: 1\n";
        assert_eq!(parse_crawl_delay(body), 1.0);
    }

    #[test]
    fn float_delay() {
        assert_eq!(parse_crawl_delay("Crawl-delay: 1.5"), 1.5);
    }

    #[test]
    fn negative_delay_clamps_to_zero() {
        assert_eq!(parse_crawl_delay("Crawl-delay: -1.5"), 0.0);
    }

    #[test]
    fn trailing_garbage_is_truncated_by_the_digit_class() {
        assert_eq!(parse_crawl_delay("Crawl-delay: 1.5sdf"), 1.5);
    }

    #[test]
    fn pure_garbage_yields_zero() {
        assert_eq!(parse_crawl_delay("Crawl-delay: sdf"), 0.0);
    }

    #[test]
    fn disallow_lines_are_collected_globally_ignoring_agent_grouping() {
        let body = "User-agent: Googlebot\nDisallow: /only-google\n\nUser-agent: *\nDisallow: /everyone\n";
        let found = parse_disallowed(body);
        assert_eq!(found, vec!["/only-google", "/everyone"]);
    }

    #[test]
    fn policy_parse_combines_both() {
        let policy = RobotsPolicy::parse("Disallow: /private\nCrawl-delay: 2\n", "anything");
        assert_eq!(policy.disallow, vec!["/private"]);
        assert_eq!(policy.crawl_delay, 2.0);
    }
}
