//! [`Transport`] implementation over `reqwest`.

use super::{
    RequestBody, RequestOptions, Transport, TransportError, TransportErrorKind, TransportRequest,
    TransportResponse,
};
use crate::config::ClientConfig;
use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Method, Url};
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

/// A `reqwest::Client` built for exactly one call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Transport for HttpTransport {
    fn open(config: &ClientConfig, options: &RequestOptions) -> Result<Self, TransportError> {
        let policy = if options.allow_redirects.unwrap_or(true) {
            redirect::Policy::limited(options.max_redirects.unwrap_or(config.max_redirects))
        } else {
            redirect::Policy::none()
        };

        let default_headers = header_map(
            config
                .default_headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )?;

        let mut builder = reqwest::Client::builder()
            .redirect(policy)
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers);

        let deadlines = Deadlines::resolve(config, options);
        if let Some(timeout) = deadlines.connect {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = deadlines.total {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.read_timeout {
            builder = builder.read_timeout(timeout);
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Option<TransportResponse>, TransportError> {
        let url = parse_url(url)?;
        let headers = header_map(options.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let mut builder = self.client.request(method, url).headers(headers);
        if !options.params.is_empty() {
            builder = builder.query(&options.params);
        }
        builder = match options.body {
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
            None => builder,
        };

        let request = builder.build()?;
        let sent = TransportRequest::new(request.method().clone(), request.url().clone())
            .with_headers(request.headers().clone());

        tracing::trace!(method = %sent.method, url = %sent.url, "sending request");

        let started = Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportError::from(e).with_request(sent.clone()))?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from(e).with_request(sent.clone()))?;

        Ok(Some(TransportResponse {
            status,
            version,
            headers,
            body,
            url: final_url,
            elapsed: started.elapsed(),
            request: sent,
            reason,
        }))
    }
}

/// Deadlines handed to the reqwest client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deadlines {
    connect: Option<Duration>,
    total: Option<Duration>,
}

impl Deadlines {
    /// `timeout` bounds the connect phase and the wait after it separately.
    ///
    /// reqwest's overall deadline starts with the request, so it is stretched
    /// by the connect budget. An expired connect then surfaces from the
    /// connector, flagged as a connect error, instead of racing the overall
    /// deadline.
    fn resolve(config: &ClientConfig, options: &RequestOptions) -> Self {
        let timeout = options.timeout.or_else(|| config.timeout());
        let connect = options
            .connect_timeout
            .or_else(|| config.connect_timeout())
            .or(timeout);
        let total = timeout.map(|t| t + connect.unwrap_or_default());
        Self { connect, total }
    }
}

/// Parse and vet a request URL before handing it to reqwest.
fn parse_url(raw: &str) -> Result<Url, TransportError> {
    let url = Url::parse(raw).map_err(|e| {
        let message = match e {
            url::ParseError::RelativeUrlWithoutBase => {
                format!("Invalid URL '{raw}': missing URL scheme")
            }
            other => format!("Invalid URL '{raw}': {other}"),
        };
        TransportError::new(TransportErrorKind::InvalidUrl, message).with_source(e)
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TransportError::new(
            TransportErrorKind::UnsupportedProtocol,
            format!("Request URL has an unsupported protocol '{scheme}://': {raw}"),
        )),
    }
}

fn header_map<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::new(
                TransportErrorKind::LocalProtocol,
                format!("Invalid header name {name:?}"),
            )
            .with_source(e)
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::new(
                TransportErrorKind::LocalProtocol,
                format!("Invalid header value for {name}"),
            )
            .with_source(e)
        })?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = kind_of(&err);
        // The url stays on the attached request; keeping it out of the
        // message stops host and path text from steering classification.
        let err = err.without_url();
        let message = describe(&err);
        TransportError::new(kind, message).with_source(err)
    }
}

fn kind_of(err: &reqwest::Error) -> TransportErrorKind {
    use TransportErrorKind::*;

    if err.is_timeout() {
        // reqwest only flags the connect phase; everything later is a read.
        return if err.is_connect() { ConnectTimeout } else { ReadTimeout };
    }
    if err.is_connect() {
        return Connect;
    }
    if err.is_redirect() {
        return TooManyRedirects;
    }
    if err.is_decode() {
        return Decoding;
    }
    if err.is_status() {
        return HttpStatus;
    }
    if err.is_builder() {
        return if find_cause::<url::ParseError>(err).is_some() {
            InvalidUrl
        } else {
            LocalProtocol
        };
    }
    if err.is_body() || err.is_request() {
        return find_cause::<io::Error>(err)
            .map(|io| match io.kind() {
                io::ErrorKind::TimedOut => ReadTimeout,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::UnexpectedEof => Read,
                io::ErrorKind::BrokenPipe | io::ErrorKind::WriteZero => Write,
                _ => Network,
            })
            .unwrap_or(RemoteProtocol);
    }
    Transport
}

fn find_cause<'a, T: StdError + 'static>(err: &'a reqwest::Error) -> Option<&'a T> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(found) = cause.downcast_ref::<T>() {
            return Some(found);
        }
        source = cause.source();
    }
    None
}

/// The reqwest message followed by its cause chain, so TLS and proxy details
/// buried in the chain stay visible to message-based classification.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
