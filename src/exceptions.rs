//! Dual-taxonomy errors.
//!
//! Every [`AreqError`] wraps one [`TransportError`] and answers is-a questions
//! against three hierarchies at once:
//!
//! * [`ErrorCategory`], this crate's own error types,
//! * [`CompatKind`], the taxonomy of a conventional synchronous HTTP client,
//! * [`TransportErrorKind`], the taxonomy of the async transport.
//!
//! Each category carries one marker per foreign taxonomy; is-a checks are
//! membership tests over those markers and their ancestors.
//!
//! Classification by message text (`ssl`/`tls`/`proxy` for connect failures,
//! scheme keywords for invalid URLs) depends on the wording of the transport
//! and its TLS stack. It is kept for compatibility, not as a stable contract.

use crate::error::Error;
use crate::models::{create_request, create_response, AreqRequest, AreqResponse};
use crate::transport::{TransportError, TransportErrorKind};
use std::sync::Arc;
use thiserror::Error;

const SCHEMA_KEYWORDS: [&str; 3] = ["missing url scheme", "invalid url scheme", "missing schema"];

/// Error types of a conventional synchronous HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatKind {
    RequestException,
    HttpError,
    ConnectionError,
    ProxyError,
    SslError,
    Timeout,
    ConnectTimeout,
    ReadTimeout,
    TooManyRedirects,
    InvalidUrl,
    MissingSchema,
    ContentDecodingError,
}

impl CompatKind {
    #[must_use]
    pub fn parents(self) -> &'static [CompatKind] {
        use CompatKind::*;
        match self {
            RequestException => &[],
            ProxyError | SslError => &[ConnectionError],
            ConnectTimeout => &[ConnectionError, Timeout],
            ReadTimeout => &[Timeout],
            HttpError | ConnectionError | Timeout | TooManyRedirects | InvalidUrl
            | MissingSchema | ContentDecodingError => &[RequestException],
        }
    }

    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        self == other || self.parents().iter().any(|parent| parent.is_a(other))
    }
}

/// This crate's error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Base,
    Http,
    Connection,
    Timeout,
    ConnectTimeout,
    ReadTimeout,
    TooManyRedirects,
    InvalidUrl,
    MissingSchema,
    Ssl,
    Proxy,
    ContentDecoding,
}

impl ErrorCategory {
    #[must_use]
    pub fn parents(self) -> &'static [ErrorCategory] {
        use ErrorCategory::*;
        match self {
            Base => &[],
            ConnectTimeout => &[Timeout, Connection],
            ReadTimeout => &[Timeout],
            MissingSchema => &[InvalidUrl],
            Ssl | Proxy => &[Connection],
            Http | Connection | Timeout | TooManyRedirects | InvalidUrl | ContentDecoding => {
                &[Base]
            }
        }
    }

    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        self == other || self.parents().iter().any(|parent| parent.is_a(other))
    }

    /// The matching type in the synchronous client's taxonomy.
    #[must_use]
    pub fn compat_marker(self) -> CompatKind {
        match self {
            Self::Base => CompatKind::RequestException,
            Self::Http => CompatKind::HttpError,
            Self::Connection => CompatKind::ConnectionError,
            Self::Timeout => CompatKind::Timeout,
            Self::ConnectTimeout => CompatKind::ConnectTimeout,
            Self::ReadTimeout => CompatKind::ReadTimeout,
            Self::TooManyRedirects => CompatKind::TooManyRedirects,
            Self::InvalidUrl => CompatKind::InvalidUrl,
            Self::MissingSchema => CompatKind::MissingSchema,
            Self::Ssl => CompatKind::SslError,
            Self::Proxy => CompatKind::ProxyError,
            Self::ContentDecoding => CompatKind::ContentDecodingError,
        }
    }

    /// The matching type in the transport's taxonomy.
    #[must_use]
    pub fn transport_marker(self) -> TransportErrorKind {
        match self {
            Self::Base => TransportErrorKind::Http,
            Self::Http => TransportErrorKind::HttpStatus,
            Self::Connection => TransportErrorKind::Network,
            Self::Timeout => TransportErrorKind::Timeout,
            Self::ConnectTimeout => TransportErrorKind::ConnectTimeout,
            Self::ReadTimeout => TransportErrorKind::ReadTimeout,
            Self::TooManyRedirects => TransportErrorKind::TooManyRedirects,
            Self::InvalidUrl | Self::MissingSchema => TransportErrorKind::InvalidUrl,
            Self::Ssl | Self::Proxy => TransportErrorKind::Connect,
            Self::ContentDecoding => TransportErrorKind::Decoding,
        }
    }

    fn answers_compat(self, kind: CompatKind) -> bool {
        self.compat_marker().is_a(kind) || self.parents().iter().any(|p| p.answers_compat(kind))
    }
}

/// A request failure, classified.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AreqError {
    category: ErrorCategory,
    message: String,
    request: Option<AreqRequest>,
    response: Option<AreqResponse>,
    #[source]
    underlying: Arc<TransportError>,
}

impl AreqError {
    fn build(category: ErrorCategory, error: Arc<TransportError>) -> Self {
        Self {
            category,
            message: error.to_string(),
            request: create_request(error.request()),
            response: create_response(error.response().cloned()),
            underlying: error,
        }
    }

    /// Base-category error.
    pub fn new(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Base, error.into())
    }

    /// Build a specific category directly, bypassing [`classify`].
    ///
    /// # Errors
    /// `MissingSchema` requires the cause's message to name a missing or
    /// invalid scheme; anything else is a construction error.
    pub fn with_category(
        category: ErrorCategory,
        error: impl Into<Arc<TransportError>>,
    ) -> Result<Self, Error> {
        let error = error.into();
        if category == ErrorCategory::MissingSchema && !mentions_schema(&error) {
            return Err(Error::construction(format!(
                "Not a missing schema error: {error}"
            )));
        }
        Ok(Self::build(category, error))
    }

    pub fn http(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Http, error.into())
    }

    pub fn connection(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Connection, error.into())
    }

    pub fn timeout(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Timeout, error.into())
    }

    pub fn connect_timeout(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::ConnectTimeout, error.into())
    }

    pub fn read_timeout(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::ReadTimeout, error.into())
    }

    pub fn too_many_redirects(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::TooManyRedirects, error.into())
    }

    pub fn invalid_url(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::InvalidUrl, error.into())
    }

    /// # Errors
    /// See [`with_category`](Self::with_category).
    pub fn missing_schema(error: impl Into<Arc<TransportError>>) -> Result<Self, Error> {
        Self::with_category(ErrorCategory::MissingSchema, error)
    }

    pub fn ssl(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Ssl, error.into())
    }

    pub fn proxy(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::Proxy, error.into())
    }

    pub fn content_decoding(error: impl Into<Arc<TransportError>>) -> Self {
        Self::build(ErrorCategory::ContentDecoding, error.into())
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn request(&self) -> Option<&AreqRequest> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&AreqResponse> {
        self.response.as_ref()
    }

    /// The original transport error, same allocation as was passed in.
    pub fn underlying(&self) -> &Arc<TransportError> {
        &self.underlying
    }

    pub fn is(&self, category: ErrorCategory) -> bool {
        self.category.is_a(category)
    }

    pub fn is_compat(&self, kind: CompatKind) -> bool {
        self.category.answers_compat(kind)
    }

    pub fn is_transport(&self, kind: TransportErrorKind) -> bool {
        kind == TransportErrorKind::Http
            || self.category.transport_marker().is_a(kind)
            || self.underlying.is(kind)
    }
}

fn mentions(error: &TransportError, needles: &[&str]) -> bool {
    let message = error.message().to_lowercase();
    needles.iter().any(|needle| message.contains(needle))
}

fn mentions_schema(error: &TransportError) -> bool {
    mentions(error, &SCHEMA_KEYWORDS)
}

type Rule = (fn(&TransportError) -> bool, ErrorCategory);

/// Classification rules, most specific first. The first match wins.
const RULES: &[Rule] = &[
    (
        |e| e.kind() == TransportErrorKind::InvalidUrl && mentions_schema(e),
        ErrorCategory::MissingSchema,
    ),
    (|e| e.kind() == TransportErrorKind::InvalidUrl, ErrorCategory::InvalidUrl),
    (|e| e.kind() == TransportErrorKind::HttpStatus, ErrorCategory::Http),
    (|e| e.kind() == TransportErrorKind::ConnectTimeout, ErrorCategory::ConnectTimeout),
    (|e| e.kind() == TransportErrorKind::ReadTimeout, ErrorCategory::ReadTimeout),
    (|e| e.kind() == TransportErrorKind::WriteTimeout, ErrorCategory::Timeout),
    (|e| e.kind() == TransportErrorKind::PoolTimeout, ErrorCategory::ConnectTimeout),
    (|e| e.is(TransportErrorKind::Timeout), ErrorCategory::Timeout),
    (
        |e| e.kind() == TransportErrorKind::Connect && mentions(e, &["ssl", "tls"]),
        ErrorCategory::Ssl,
    ),
    (
        |e| e.kind() == TransportErrorKind::Connect && mentions(e, &["proxy"]),
        ErrorCategory::Proxy,
    ),
    (|e| e.kind() == TransportErrorKind::Connect, ErrorCategory::Connection),
    (
        |e| matches!(e.kind(), TransportErrorKind::Read | TransportErrorKind::Write),
        ErrorCategory::Connection,
    ),
    (|e| e.is(TransportErrorKind::Protocol), ErrorCategory::Connection),
    (|e| e.kind() == TransportErrorKind::TooManyRedirects, ErrorCategory::TooManyRedirects),
    (|e| e.kind() == TransportErrorKind::Decoding, ErrorCategory::ContentDecoding),
    (|e| e.kind() == TransportErrorKind::CookieConflict, ErrorCategory::Base),
    (|e| e.is(TransportErrorKind::Network), ErrorCategory::Connection),
    (|e| e.is(TransportErrorKind::Transport), ErrorCategory::Base),
];

/// Pick the category for a transport error without building an `AreqError`.
pub fn category_of(error: &TransportError) -> ErrorCategory {
    RULES
        .iter()
        .find(|(matches, _)| matches(error))
        .map_or(ErrorCategory::Base, |&(_, category)| category)
}

/// Convert a transport error into the most specific [`AreqError`].
pub fn classify(error: impl Into<Arc<TransportError>>) -> AreqError {
    let error = error.into();
    let category = category_of(&error);
    tracing::trace!(kind = %error.kind(), ?category, "classified transport error");
    AreqError::build(category, error)
}

impl From<TransportError> for AreqError {
    fn from(error: TransportError) -> Self {
        classify(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportRequest, TransportResponse};
    use reqwest::{Method, StatusCode, Url};
    use std::error::Error as _;
    use TransportErrorKind as K;

    fn err(kind: TransportErrorKind, message: &str) -> Arc<TransportError> {
        Arc::new(TransportError::new(kind, message))
    }

    fn status_error(status: u16) -> Arc<TransportError> {
        let url = Url::parse("https://example.com").unwrap();
        let request = TransportRequest::new(Method::GET, url);
        let response = Arc::new(
            TransportResponse::new(StatusCode::from_u16(status).unwrap(), request.clone())
                .with_body("not found"),
        );
        Arc::new(
            TransportError::new(K::HttpStatus, format!("{status} Not Found"))
                .with_request(request)
                .with_response(response),
        )
    }

    #[test]
    fn test_base_exception() {
        let cause = err(K::Http, "test error");
        let exc = AreqError::new(Arc::clone(&cause));
        assert_eq!(exc.category(), ErrorCategory::Base);
        assert!(exc.is_compat(CompatKind::RequestException));
        assert!(exc.is_transport(K::Http));
        assert!(Arc::ptr_eq(exc.underlying(), &cause));
        assert_eq!(exc.to_string(), cause.to_string());
        assert!(exc.request().is_none());
        assert!(exc.response().is_none());
    }

    #[test]
    fn test_http_error() {
        let cause = status_error(404);
        let exc = AreqError::http(Arc::clone(&cause));
        assert!(exc.is(ErrorCategory::Http));
        assert!(exc.is(ErrorCategory::Base));
        assert!(exc.is_compat(CompatKind::HttpError));
        assert!(exc.is_transport(K::HttpStatus));
        assert_eq!(exc.response().unwrap().status_code(), 404);
        assert_eq!(exc.response().unwrap().text(), "not found");
        assert_eq!(exc.request().unwrap().method(), "GET");
        assert!(Arc::ptr_eq(exc.underlying(), &cause));
    }

    #[test]
    fn test_connect_timeout_answers_three_families() {
        let exc = AreqError::connect_timeout(err(K::ConnectTimeout, "connection timed out"));
        assert!(exc.is(ErrorCategory::ConnectTimeout));
        assert!(exc.is(ErrorCategory::Timeout));
        assert!(exc.is(ErrorCategory::Connection));
        assert!(exc.is_compat(CompatKind::ConnectTimeout));
        assert!(exc.is_compat(CompatKind::Timeout));
        assert!(exc.is_compat(CompatKind::ConnectionError));
        assert!(exc.is_compat(CompatKind::RequestException));
        assert!(exc.is_transport(K::ConnectTimeout));
        assert!(exc.is_transport(K::Timeout));
    }

    #[test]
    fn test_read_timeout_is_not_connection_error() {
        let exc = AreqError::read_timeout(err(K::ReadTimeout, "read timed out"));
        assert!(exc.is(ErrorCategory::Timeout));
        assert!(exc.is_compat(CompatKind::ReadTimeout));
        assert!(!exc.is(ErrorCategory::Connection));
        assert!(!exc.is_compat(CompatKind::ConnectionError));
    }

    #[test]
    fn test_missing_schema_requires_keywords() {
        let exc = AreqError::missing_schema(err(K::InvalidUrl, "Missing URL scheme")).unwrap();
        assert!(exc.is(ErrorCategory::MissingSchema));
        assert!(exc.is(ErrorCategory::InvalidUrl));
        assert!(exc.is_compat(CompatKind::MissingSchema));
        assert!(exc.is_compat(CompatKind::InvalidUrl));
        assert!(exc.is_transport(K::InvalidUrl));

        let result = AreqError::missing_schema(err(K::InvalidUrl, "other invalid url error"));
        assert!(matches!(result, Err(Error::Construction { .. })));
    }

    #[test]
    fn test_ssl_and_proxy_are_connection_errors() {
        let ssl = AreqError::ssl(err(K::Connect, "ssl error"));
        assert!(ssl.is(ErrorCategory::Connection));
        assert!(ssl.is_compat(CompatKind::SslError));
        assert!(ssl.is_compat(CompatKind::ConnectionError));
        assert!(!ssl.is_compat(CompatKind::ProxyError));

        let proxy = AreqError::proxy(err(K::Connect, "proxy error"));
        assert!(proxy.is_compat(CompatKind::ProxyError));
        assert!(proxy.is_transport(K::Network));
    }

    #[test]
    fn test_classify_table() {
        let cases = [
            (status_error(404), ErrorCategory::Http),
            (err(K::Connect, "connection failed"), ErrorCategory::Connection),
            (err(K::Connect, "TLS handshake eof"), ErrorCategory::Ssl),
            (err(K::Connect, "SSL: CERTIFICATE_VERIFY_FAILED"), ErrorCategory::Ssl),
            (err(K::Connect, "Proxy refused"), ErrorCategory::Proxy),
            (err(K::ReadTimeout, "read timeout"), ErrorCategory::ReadTimeout),
            (err(K::ConnectTimeout, "connect timeout"), ErrorCategory::ConnectTimeout),
            (err(K::WriteTimeout, "write timeout"), ErrorCategory::Timeout),
            (err(K::PoolTimeout, "pool timeout"), ErrorCategory::ConnectTimeout),
            (err(K::Timeout, "timed out"), ErrorCategory::Timeout),
            (err(K::Read, "connection reset"), ErrorCategory::Connection),
            (err(K::Write, "broken pipe"), ErrorCategory::Connection),
            (err(K::RemoteProtocol, "server disconnected"), ErrorCategory::Connection),
            (err(K::LocalProtocol, "bad header"), ErrorCategory::Connection),
            (err(K::Protocol, "protocol"), ErrorCategory::Connection),
            (err(K::TooManyRedirects, "too many redirects"), ErrorCategory::TooManyRedirects),
            (err(K::Decoding, "decoding error"), ErrorCategory::ContentDecoding),
            (err(K::CookieConflict, "cookie conflict"), ErrorCategory::Base),
            (err(K::Close, "close failed"), ErrorCategory::Connection),
            (err(K::Network, "network down"), ErrorCategory::Connection),
            (err(K::Proxy, "proxy error"), ErrorCategory::Base),
            (err(K::UnsupportedProtocol, "ftp"), ErrorCategory::Base),
            (err(K::Transport, "transport"), ErrorCategory::Base),
            (err(K::InvalidUrl, "invalid url"), ErrorCategory::InvalidUrl),
            (err(K::InvalidUrl, "Invalid URL scheme"), ErrorCategory::MissingSchema),
            (err(K::Http, "anything"), ErrorCategory::Base),
        ];

        for (cause, expected) in cases {
            let exc = classify(Arc::clone(&cause));
            assert_eq!(exc.category(), expected, "classifying {}", cause);
            assert!(Arc::ptr_eq(exc.underlying(), &cause));
            assert!(exc.is_compat(expected.compat_marker()));
            assert!(exc.is_transport(expected.transport_marker()));
            assert!(exc.is_compat(CompatKind::RequestException));
        }
    }

    #[test]
    fn test_source_chain_exposes_cause() {
        let exc = classify(TransportError::new(K::Read, "connection reset"));
        let source = exc.source().unwrap();
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn test_compat_hierarchy() {
        assert!(CompatKind::ConnectTimeout.is_a(CompatKind::ConnectionError));
        assert!(CompatKind::ConnectTimeout.is_a(CompatKind::Timeout));
        assert!(CompatKind::SslError.is_a(CompatKind::RequestException));
        assert!(!CompatKind::MissingSchema.is_a(CompatKind::InvalidUrl));
        assert!(!CompatKind::HttpError.is_a(CompatKind::ConnectionError));
    }

    #[test]
    fn test_every_compat_kind_has_a_category() {
        use ErrorCategory::*;
        let markers: Vec<CompatKind> = [
            Base,
            Http,
            Connection,
            Timeout,
            ConnectTimeout,
            ReadTimeout,
            TooManyRedirects,
            InvalidUrl,
            MissingSchema,
            Ssl,
            Proxy,
            ContentDecoding,
        ]
        .into_iter()
        .map(ErrorCategory::compat_marker)
        .collect();

        for kind in [
            CompatKind::RequestException,
            CompatKind::HttpError,
            CompatKind::ConnectionError,
            CompatKind::ProxyError,
            CompatKind::SslError,
            CompatKind::Timeout,
            CompatKind::ConnectTimeout,
            CompatKind::ReadTimeout,
            CompatKind::TooManyRedirects,
            CompatKind::InvalidUrl,
            CompatKind::MissingSchema,
            CompatKind::ContentDecodingError,
        ] {
            assert!(markers.contains(&kind), "{kind:?} has no category");
        }
    }
}
