//! Human-readable summary output, grounded on `crul/output.py::output_text`.

use std::io::Write;

use crate::core::model::Page;
use crate::error::CrawlError;

/// Write one human-readable block per page: its URL, title, depth, links, and assets.
///
/// The `#{n}:` line shows the request URL (`page.url`), not the canonical URL —
/// `output_text` prints `page.url or page.canonical_url`, and `page.url` is always
/// populated, so the canonical never surfaces here. Sitemap output prefers canonical.
pub fn write_text<W: Write>(mut out: W, pages: &[Page]) -> Result<(), CrawlError> {
    for (n, page) in pages.iter().enumerate() {
        writeln!(out, "#{n}: {}", page.url)?;
        writeln!(out, "  Title: {}", page.title.as_deref().unwrap_or(""))?;
        writeln!(out, "  Depth: {}", page.depth)?;
        writeln!(out, "  Links:")?;
        for link in &page.links {
            writeln!(out, "    - {}", link.href)?;
        }
        writeln!(out, "  Assets:")?;
        for asset in &page.assets {
            writeln!(out, "    - {}: {}", asset.link_type, asset.href)?;
        }
    }
    Ok(())
}
