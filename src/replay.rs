//! NDJSON replay reader (§4.12), grounded on `crul/__main__.py::main_replay`: load
//! previously-scraped Pages from a file or stdin, with no network I/O, so a prior
//! `--json` crawl can be re-rendered through a different output format.

use std::io::BufRead;

use crate::core::model::Page;
use crate::error::CrawlError;

/// Read one `Page` per non-blank line from `reader`.
pub fn read_pages<R: BufRead>(reader: R) -> Result<Vec<Page>, CrawlError> {
    let mut pages = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        pages.push(Page::from_json_line(&line)?);
    }
    Ok(pages)
}
