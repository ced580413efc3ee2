//! `sitecrawl` fetches a single site breadth-first, respecting `robots.txt` and a
//! configurable rate limit, and streams back each page as it completes.

pub mod core;
pub mod error;
pub mod output;
pub mod replay;

pub use crate::core::{Crawler, CrawlerBuilder, CrawlerConfig, CrawlHandle};
pub use crate::core::{Headers, Link, LinkType, Page, Task};
pub use error::CrawlError;
