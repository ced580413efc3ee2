//! The crawl engine: URL canonicalization, politeness, parsing, traversal, the
//! rate-limited queue, the worker pool, the sentinel, and the `Crawler` façade that
//! wires them together.

pub mod crawler;
pub mod disallow;
pub mod http;
pub mod model;
pub mod parser;
pub mod queue;
pub mod robots;
pub mod sentinel;
pub mod traverser;
pub mod url_canon;
pub mod worker;

pub use crawler::{Crawler, CrawlerBuilder, CrawlerConfig, CrawlHandle};
pub use model::{Headers, Link, LinkType, Page, Task};
