//! HTTP fetcher implementation
//!
//! This module handles all outbound page requests for the harvester, including:
//! - Building the shared HTTP client with the configured user agent
//! - Single-attempt GET requests with a per-request timeout
//! - Error classification (HTTP status vs. network failure)
//! - Content-type sniffing for PDF documents
//!
//! There are no retries: every fetch is attempted exactly once and dies on its own clock.

use crate::config::UserAgentConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched response body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value (empty when absent)
    pub content_type: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true when the response is a PDF by content-type or by the requested URL's suffix
    pub fn is_pdf(&self, requested_url: &str) -> bool {
        is_pdf_response(&self.content_type, requested_url)
    }

    /// Decodes the body as text, replacing invalid UTF-8 sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page (2xx)
    Success(FetchedPage),

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, DNS failure, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the per-request timeout fired
        timed_out: bool,
    },
}

/// Builds the HTTP client shared by every stage of a harvest
///
/// No client-wide timeout is set; each request carries its own.
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once with the given timeout
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx, body read | `Success` |
/// | Any other status | `HttpError` |
/// | Timeout (send or body) | `NetworkError { timed_out: true }` |
/// | Connection/DNS/TLS failure | `NetworkError { timed_out: false }` |
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        }),
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}

/// Returns true when a response should be treated as a PDF document
pub fn is_pdf_response(content_type: &str, url: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/pdf")
        || url.to_ascii_lowercase().ends_with(".pdf")
}
