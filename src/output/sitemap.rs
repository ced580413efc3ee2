//! XML sitemap output, grounded on `crul/output.py::output_sitemap`. Escaping is done
//! by hand rather than pulling in an XML-writing crate for a three-element document,
//! matching the scope of `crul`'s `html_escape` call on each `<loc>`.

use std::io::Write;

use crate::core::model::Page;
use crate::error::CrawlError;

const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
    "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"\n",
    "   xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n",
    "   xsi:schemaLocation=\"http://www.sitemaps.org/schemas/sitemap/0.9 ",
    "http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd\">",
);

/// Write a `sitemap.xml`-shaped document with one `<url><loc>` per page.
pub fn write_sitemap<W: Write>(mut out: W, pages: &[Page]) -> Result<(), CrawlError> {
    writeln!(out, "{HEADER}")?;
    for page in pages {
        writeln!(out, "  <url><loc>{}</loc></url>", escape(page.display_url()))?;
    }
    writeln!(out, "</urlset>")?;
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
