//! Transport abstraction.
//!
//! A transport performs the actual I/O for [`crate::ajax`]. It is called on
//! the event loop thread and must return once the response is available.

use crate::options::Method;
use thiserror::Error;

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Resolved target URL
    pub url: String,
    /// Request body
    pub body: Option<String>,
}

/// A completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Status reason phrase, e.g. "Not Found"
    pub status_text: String,
    /// Raw response body
    pub body: String,
}

impl Response {
    /// Creates a response.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be delivered
    #[error("network error: {0}")]
    Network(String),
    /// The URL could not be understood by the transport
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Sends requests and returns their responses.
pub trait Transport {
    /// Performs `request`.
    fn send(&self, request: &Request) -> Result<Response, TransportError>;

    /// URL used when a request does not name one.
    fn location(&self) -> String {
        "about:blank".to_string()
    }
}
