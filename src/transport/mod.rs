//! The asynchronous transport this crate adapts.
//!
//! Transports perform the actual network I/O and hand back fully read
//! [`TransportResponse`]s or typed [`TransportError`]s. Everything above this
//! module only reshapes what a transport returns.

pub mod error;
mod http;
mod options;

pub use error::{is_error_type, BoxError, TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use options::{RequestBody, RequestOptions};

use crate::config::ClientConfig;
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url, Version};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A transport opened for a single call.
pub trait Transport: Sized + Send + Sync {
    /// Open a transport configured for one request.
    ///
    /// # Errors
    /// Returns a `TransportError` if the underlying client cannot be built.
    fn open(config: &ClientConfig, options: &RequestOptions) -> Result<Self, TransportError>;

    /// Perform one request. `Ok(None)` means the transport finished without
    /// producing a response.
    fn send(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> impl Future<Output = Result<Option<TransportResponse>, TransportError>> + Send;
}

/// The request as the transport sent it.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// A completed response with its body fully read.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub url: Url,
    pub elapsed: Duration,
    pub request: TransportRequest,
    /// The status line's phrase when the server sent a non-canonical one.
    pub reason: Option<String>,
}

impl TransportResponse {
    /// A response to `request` with an empty body, served from the request url.
    pub fn new(status: StatusCode, request: TransportRequest) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            url: request.url.clone(),
            elapsed: Duration::ZERO,
            request,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The phrase the server sent, else the canonical one for the status.
    pub fn reason_phrase(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }

    /// The `charset` parameter of the `Content-Type` header, if any.
    pub fn encoding(&self) -> Option<String> {
        let content_type = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                (!value.is_empty()).then(|| value.to_string())
            } else {
                None
            }
        })
    }

    /// Fail with an `HttpStatus` error for 4xx and 5xx responses.
    ///
    /// # Errors
    /// Returns the error with both request and response attached.
    pub fn error_for_status(self: &Arc<Self>) -> Result<(), TransportError> {
        let class = if self.status.is_client_error() {
            "Client error"
        } else if self.status.is_server_error() {
            "Server error"
        } else {
            return Ok(());
        };

        let message = format!(
            "{} '{} {}' for url '{}'",
            class,
            self.status.as_u16(),
            self.reason_phrase(),
            self.url
        );
        Err(TransportError::new(TransportErrorKind::HttpStatus, message)
            .with_request(self.request.clone())
            .with_response(Arc::clone(self)))
    }
}
