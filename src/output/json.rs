//! NDJSON output, grounded on `crul/output.py::output_json` and `JSONSerialiser`.

use std::io::Write;

use crate::core::model::Page;
use crate::error::CrawlError;

/// Write one JSON object per page, newline-delimited, matching `Page::to_json_line`.
pub fn write_json<W: Write>(mut out: W, pages: &[Page]) -> Result<(), CrawlError> {
    for page in pages {
        writeln!(out, "{}", page.to_json_line()?)?;
    }
    Ok(())
}
