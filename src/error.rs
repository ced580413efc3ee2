//! Typed error surface for the crawl core and its ambient layers.

use thiserror::Error;

/// Errors that can be surfaced from a crawl, either at setup time or in-band on the
/// completed channel.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("invalid seed URL: {0}")]
    InvalidSeedUrl(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The narrow transport-error class the worker retry policy distinguishes from other
/// failures (§4.7/§7: "connection error" vs. "any other exception").
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn into_crawl_error(self, url: &str) -> CrawlError {
        let message = match self {
            TransportError::Connection(m) => m,
            TransportError::Other(m) => m,
        };
        CrawlError::Transport {
            url: url.to_string(),
            message,
        }
    }
}
