//! Output renderers (§4.11): text, NDJSON, and XML sitemap, mirroring
//! `crul/output.py`'s three formats.

mod json;
mod sitemap;
mod text;

pub use json::write_json;
pub use sitemap::write_sitemap;
pub use text::write_text;
