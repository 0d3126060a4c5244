//! Errors raised by the asynchronous transport.
//!
//! [`TransportErrorKind`] mirrors the error hierarchy of an async HTTP client:
//! a single root (`Http`) with request, transport, timeout and network
//! families beneath it, plus two stand-alone roots (`InvalidUrl`,
//! `CookieConflict`) that sit outside the request hierarchy.

use super::{TransportRequest, TransportResponse};
use std::sync::Arc;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One node in the transport error hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Http,
    Request,
    Transport,
    Timeout,
    ConnectTimeout,
    ReadTimeout,
    WriteTimeout,
    PoolTimeout,
    Network,
    Connect,
    Read,
    Write,
    Close,
    Protocol,
    LocalProtocol,
    RemoteProtocol,
    Proxy,
    UnsupportedProtocol,
    Decoding,
    TooManyRedirects,
    HttpStatus,
    InvalidUrl,
    CookieConflict,
}

impl TransportErrorKind {
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        use TransportErrorKind::*;
        match self {
            Http | InvalidUrl | CookieConflict => None,
            Request | HttpStatus => Some(Http),
            Transport | Decoding | TooManyRedirects => Some(Request),
            Timeout | Network | Protocol | Proxy | UnsupportedProtocol => Some(Transport),
            ConnectTimeout | ReadTimeout | WriteTimeout | PoolTimeout => Some(Timeout),
            Connect | Read | Write | Close => Some(Network),
            LocalProtocol | RemoteProtocol => Some(Protocol),
        }
    }

    /// True when `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        use TransportErrorKind::*;
        match self {
            Http => "HTTPError",
            Request => "RequestError",
            Transport => "TransportError",
            Timeout => "TimeoutException",
            ConnectTimeout => "ConnectTimeout",
            ReadTimeout => "ReadTimeout",
            WriteTimeout => "WriteTimeout",
            PoolTimeout => "PoolTimeout",
            Network => "NetworkError",
            Connect => "ConnectError",
            Read => "ReadError",
            Write => "WriteError",
            Close => "CloseError",
            Protocol => "ProtocolError",
            LocalProtocol => "LocalProtocolError",
            RemoteProtocol => "RemoteProtocolError",
            Proxy => "ProxyError",
            UnsupportedProtocol => "UnsupportedProtocol",
            Decoding => "DecodingError",
            TooManyRedirects => "TooManyRedirects",
            HttpStatus => "HTTPStatusError",
            InvalidUrl => "InvalidURL",
            CookieConflict => "CookieConflict",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An error raised by a transport after (or while) attempting a request.
///
/// The request and response are attached when the transport got far enough
/// to know them; `HttpStatus` errors always carry the response.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    request: Option<TransportRequest>,
    response: Option<Arc<TransportResponse>>,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request: None,
            response: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: TransportRequest) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: Arc<TransportResponse>) -> Self {
        self.response = Some(response);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn request(&self) -> Option<&TransportRequest> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&Arc<TransportResponse>> {
        self.response.as_ref()
    }

    /// Whether this error belongs to `kind` or one of its descendants.
    pub fn is(&self, kind: TransportErrorKind) -> bool {
        self.kind.is_a(kind)
    }
}

/// Free-function form of [`TransportError::is`].
pub fn is_error_type(error: &TransportError, kind: TransportErrorKind) -> bool {
    error.is(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransportErrorKind::*;

    #[test]
    fn test_timeouts_descend_from_transport() {
        for kind in [ConnectTimeout, ReadTimeout, WriteTimeout, PoolTimeout] {
            assert!(kind.is_a(Timeout));
            assert!(kind.is_a(Transport));
            assert!(kind.is_a(Http));
            assert!(!kind.is_a(Network));
        }
    }

    #[test]
    fn test_standalone_roots() {
        assert!(!InvalidUrl.is_a(Http));
        assert!(!CookieConflict.is_a(Http));
        assert!(HttpStatus.is_a(Http));
        assert!(!HttpStatus.is_a(Request));
    }

    #[test]
    fn test_is_error_type() {
        let err = TransportError::new(ConnectTimeout, "connect timeout");
        assert!(is_error_type(&err, ConnectTimeout));
        assert!(!is_error_type(&err, ReadTimeout));

        let err = TransportError::new(InvalidUrl, "invalid url");
        assert!(is_error_type(&err, InvalidUrl));
        assert!(!is_error_type(&err, ConnectTimeout));
    }

    #[test]
    fn test_display_is_message() {
        let err = TransportError::new(Read, "connection reset by peer");
        assert_eq!(err.to_string(), "connection reset by peer");
        assert!(std::error::Error::source(&err).is_none());
    }
}
