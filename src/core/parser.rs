//! Turns an HTTP response into a structured `Page` (§4.4).
//!
//! Grounded field-for-field on `crul/parse.py::PageParser`, tokenizing with `scraper`
//! (`Html::parse_document`, `Selector::parse`).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::core::http::FetchedResponse;
use crate::core::model::{Link, LinkType, Page};
use crate::core::url_canon::is_external;

fn canonical_link_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<([^>]+)>;\s*rel="canonical""#).expect("valid regex")
    })
}

/// Parse one HTTP response into a Page at the given request depth.
pub fn parse(response: &FetchedResponse, depth: usize) -> Page {
    if looks_like_html(response) {
        parse_html(response, depth)
    } else {
        Page {
            url: response.request_url.to_string(),
            canonical_url: response.request_url.to_string(),
            fetched: true,
            headers: response.headers.clone(),
            no_index: true,
            title: None,
            depth,
            links: Vec::new(),
            assets: Vec::new(),
        }
    }
}

fn looks_like_html(response: &FetchedResponse) -> bool {
    response.status_code == 200 && response.headers.contains_ci("content-type", "html")
}

fn parse_html(response: &FetchedResponse, depth: usize) -> Page {
    let document = Html::parse_document(&response.body);
    let request_url = &response.request_url;
    let base = parse_base(&document, request_url);

    let title = parse_title(&document);
    let canonical_url = parse_canonical_url(&document, response, &base);
    let meta_content = meta_robots_content(&document);
    let no_index = contains_ci(&meta_content, "noindex")
        || response.headers.contains_ci("x-robots-tag", "noindex");
    let page_no_follow = contains_ci(&meta_content, "nofollow")
        || response.headers.contains_ci("x-robots-tag", "nofollow");

    let links = dedup_stable(parse_links(
        &document,
        request_url,
        &base,
        depth + 1,
        page_no_follow,
    ));

    let mut assets = dedup_stable(parse_assets(&document, request_url, &base, depth + 1));
    assets.sort();

    Page {
        url: request_url.to_string(),
        canonical_url,
        fetched: true,
        headers: response.headers.clone(),
        no_index,
        title,
        depth,
        links,
        assets,
    }
}

fn parse_base(document: &Html, request_url: &Url) -> Url {
    let selector = Selector::parse("base[href]").expect("valid selector");
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| request_url.join(href).ok())
        .unwrap_or_else(|| request_url.clone())
}

fn parse_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("valid selector");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

fn parse_canonical_url(document: &Html, response: &FetchedResponse, base: &Url) -> String {
    if let Some(link_header) = response.headers.get("link") {
        if let Some(captures) = canonical_link_header_re().captures(link_header) {
            if let Some(resolved) = base.join(&captures[1]).ok() {
                return resolved.to_string();
            }
        }
    }

    let selector = Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector");
    if let Some(href) = document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
    {
        if let Some(resolved) = base.join(href).ok() {
            return resolved.to_string();
        }
    }

    response.request_url.to_string()
}

fn meta_robots_content(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="robots"]"#).expect("valid selector");
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_ref()
        .map(|s| s.to_ascii_lowercase().contains(&needle.to_ascii_lowercase()))
        .unwrap_or(false)
}

fn parse_links(
    document: &Html,
    request_url: &Url,
    base: &Url,
    depth: usize,
    page_no_follow: bool,
) -> Vec<Link> {
    let selector = Selector::parse("a[href]").expect("valid selector");
    let mut out = Vec::new();
    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(resolved) = base.join(href).ok() else {
            continue;
        };
        let rel_nofollow = el
            .value()
            .attr("rel")
            .map(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("nofollow")))
            .unwrap_or(false);

        out.push(Link {
            link_type: LinkType::Anchor,
            href: resolved.to_string(),
            no_follow: page_no_follow || rel_nofollow,
            external: is_external(request_url, &resolved),
            depth,
            referrer: request_url.to_string(),
        });
    }
    out
}

const ASSET_TAGS: &[(&str, &str, fn() -> LinkType)] = &[
    ("script", "src", || LinkType::Script),
    ("img", "src", || LinkType::Img),
    ("embed", "src", || LinkType::Embed),
    ("audio", "src", || LinkType::Audio),
    ("video", "src", || LinkType::Video),
    ("iframe", "src", || LinkType::Iframe),
    ("object", "data", || LinkType::Object),
];

fn parse_assets(document: &Html, request_url: &Url, base: &Url, depth: usize) -> Vec<Link> {
    let mut out = Vec::new();

    for (tag, attr, make_type) in ASSET_TAGS {
        let selector = Selector::parse(&format!("{tag}[{attr}]")).expect("valid selector");
        for el in document.select(&selector) {
            let Some(href) = el.value().attr(attr) else {
                continue;
            };
            let Some(resolved) = base.join(href).ok() else {
                continue;
            };
            out.push(Link {
                link_type: make_type(),
                href: resolved.to_string(),
                no_follow: false,
                external: is_external(request_url, &resolved),
                depth,
                referrer: request_url.to_string(),
            });
        }
    }

    let selector = Selector::parse("link[rel][href]").expect("valid selector");
    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(resolved) = base.join(href).ok() else {
            continue;
        };
        let rel = el.value().attr("rel").unwrap_or_default();
        let rel_joined = rel.split_whitespace().collect::<Vec<_>>().join(",");
        out.push(Link {
            link_type: LinkType::Rel(rel_joined),
            href: resolved.to_string(),
            no_follow: false,
            external: is_external(request_url, &resolved),
            depth,
            referrer: request_url.to_string(),
        });
    }

    out
}

fn dedup_stable(links: Vec<Link>) -> Vec<Link> {
    let mut seen = HashSet::new();
    links.into_iter().filter(|l| seen.insert(l.clone())).collect()
}
