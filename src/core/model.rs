//! Data shapes shared across the crawl core: `Task`, `Page`, `Link`, and the
//! case-insensitive header map produced by the HTTP layer and consumed by the parser.
//!
//! Grounded on `crul/__init__.py`'s `namedtuple` definitions (Task, Page, Link) and its
//! `CaseInsensitiveDict` header wrapper.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A unit of pending work. Immutable once enqueued (§3).
#[derive(Debug, Clone)]
pub struct Task {
    pub url: Url,
    pub depth: usize,
    pub referrer: Option<String>,
}

impl Task {
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            referrer: None,
        }
    }
}

/// Case-insensitive header mapping. Keys are normalized to lowercase on insert so that
/// lookups never need to scan, matching the semantics of Python's `CaseInsensitiveDict`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// True iff the header is present and its value contains `needle`, case-insensitive.
    pub fn contains_ci(&self, name: &str, needle: &str) -> bool {
        self.get(name)
            .map(|v| v.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// The kind of reference a `Link` represents (§3/§4.4-8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkType {
    Anchor,
    Script,
    Img,
    Embed,
    Audio,
    Video,
    Iframe,
    Object,
    /// A `<link rel="...">` tag; carries the rel value(s) joined by comma.
    Rel(String),
}

impl LinkType {
    pub fn as_str(&self) -> &str {
        match self {
            LinkType::Anchor => "anchor",
            LinkType::Script => "script",
            LinkType::Img => "img",
            LinkType::Embed => "embed",
            LinkType::Audio => "audio",
            LinkType::Video => "video",
            LinkType::Iframe => "iframe",
            LinkType::Object => "object",
            LinkType::Rel(rel) => rel.as_str(),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares by string form, matching `sorted()` over the Python namedtuple's `type`
/// field (a plain string) rather than this enum's declaration order.
impl PartialOrd for LinkType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LinkType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl From<LinkType> for String {
    fn from(t: LinkType) -> Self {
        t.as_str().to_string()
    }
}

impl From<String> for LinkType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "anchor" => LinkType::Anchor,
            "script" => LinkType::Script,
            "img" => LinkType::Img,
            "embed" => LinkType::Embed,
            "audio" => LinkType::Audio,
            "video" => LinkType::Video,
            "iframe" => LinkType::Iframe,
            "object" => LinkType::Object,
            other => LinkType::Rel(other.to_string()),
        }
    }
}

/// A reference discovered inside a page (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Link {
    #[serde(rename = "type", into = "String", from = "String")]
    pub link_type: LinkType,
    pub href: String,
    pub no_follow: bool,
    pub external: bool,
    pub depth: usize,
    pub referrer: String,
}

/// The result of fetching one URL. Immutable once produced (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub canonical_url: String,
    pub fetched: bool,
    pub headers: Headers,
    pub no_index: bool,
    pub title: Option<String>,
    pub depth: usize,
    pub links: Vec<Link>,
    pub assets: Vec<Link>,
}

impl Page {
    /// Serialize to the single-line NDJSON shape of §6.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a single NDJSON line produced by `to_json_line`.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// The URL sitemap/text output should prefer: canonical if non-empty, else request.
    pub fn display_url(&self) -> &str {
        if self.canonical_url.is_empty() {
            &self.url
        } else {
            &self.canonical_url
        }
    }
}
