//! The narrow HTTP transport interface the core consumes (§4.9, §6).
//!
//! Wraps direct `reqwest::Client` usage behind a trait so the worker pool and
//! integration tests can run against a deterministic mock instead of the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::core::model::Headers;
use crate::error::TransportError;

/// The response shape the core needs: status, case-insensitive headers, body text, and
/// the final request URL (post-redirect).
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
    pub request_url: Url,
}

/// An HTTP client narrow enough for the core to depend on without pulling `reqwest`
/// into every call site. `get` takes already-built headers; the connection-error vs.
/// other-error split is encoded in `TransportError` so the worker retry policy (§4.7)
/// can distinguish them without inspecting `reqwest::Error` internals.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<FetchedResponse, TransportError>;
}

/// Production implementation: a single shared, connection-pooled `reqwest::Client`
/// with keep-alive and a fixed user-agent, TLS verification left to `reqwest`'s default
/// (§5).
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<FetchedResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(classify)?;

        let status_code = response.status().as_u16();
        let request_url = response.url().clone();
        let mut out_headers = Headers::new();
        for (name, value) in response.headers().iter() {
            if let Ok(v) = value.to_str() {
                out_headers.insert(name.as_str(), v);
            }
        }

        let body = response.text().await.map_err(classify)?;

        Ok(FetchedResponse {
            status_code,
            headers: out_headers,
            body,
            request_url,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// A canned response or error, keyed by exact request URL, for the in-process
/// integration tests of §8.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Response(FetchedResponse),
    ConnectionError,
    OtherError,
}

/// A deterministic, network-free `HttpClient` for tests. Each URL maps to a queue of
/// outcomes consumed in order, so a test can script "fail once, then succeed"
/// (§8 scenario 6) without timing dependence.
pub struct MockHttpClient {
    responses: Mutex<HashMap<String, Vec<MockOutcome>>>,
    pub requested_at: Mutex<Vec<(String, std::time::Instant)>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requested_at: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome to be returned the next time `url` is requested.
    pub fn queue(&self, url: &str, outcome: MockOutcome) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(outcome);
    }

    pub fn html(url: &str, body: &str) -> FetchedResponse {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/html; charset=utf-8");
        FetchedResponse {
            status_code: 200,
            headers,
            body: body.to_string(),
            request_url: Url::parse(url).expect("valid mock url"),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: &Url,
        _headers: HeaderMap,
    ) -> Result<FetchedResponse, TransportError> {
        self.requested_at
            .lock()
            .unwrap()
            .push((url.to_string(), std::time::Instant::now()));

        let outcome = {
            let mut map = self.responses.lock().unwrap();
            let queue = map.entry(url.to_string()).or_default();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };

        match outcome {
            Some(MockOutcome::Response(r)) => Ok(r),
            Some(MockOutcome::ConnectionError) => Err(TransportError::Connection(
                "mock connection refused".to_string(),
            )),
            Some(MockOutcome::OtherError) => {
                Err(TransportError::Other("mock request failed".to_string()))
            }
            None => Ok(FetchedResponse {
                status_code: 404,
                headers: Headers::new(),
                body: String::new(),
                request_url: url.clone(),
            }),
        }
    }
}

pub fn header_map(referrer: Option<&str>) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(referrer) = referrer {
        // Deliberately the non-standard header name `Referrer`, not `Referer` (§9).
        if let Ok(value) = HeaderValue::from_str(referrer) {
            map.insert(HeaderName::from_static("referrer"), value);
        }
    }
    map
}
