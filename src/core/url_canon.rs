//! URL normalization and comparison: `sanitize`, `resolve`, `is_external` (§4.1).
//!
//! Grounded on `crul/traverse.py::trim_fragment`/`PageTraverser.sanitize` and
//! `crul/parse.py`'s `urljoin`/netloc comparisons.

use url::Url;

/// Strip the URL fragment (everything from the first `#` onward) and strip a trailing
/// `/` from the path component. Used solely as the SeenSet key.
///
/// This is lossy — `/a` and `/a/` collide — a deliberate choice (§4.1, §9) to treat
/// slash-variant URLs as the same resource.
pub fn sanitize(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    };
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// Resolve `href` against `base` per RFC 3986. `base` should be the `<base href>` value
/// if present, else the response's request URL.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href).ok()
}

/// True iff `scheme` or `netloc` (host:port) differ between the two URLs, case-sensitive
/// on the netloc comparison (§4.1).
pub fn is_external(page_url: &Url, link_url: &Url) -> bool {
    page_url.scheme() != link_url.scheme() || netloc(page_url) != netloc(link_url)
}

fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
