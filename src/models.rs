//! Synchronous-client shaped views of transport requests and responses.
//!
//! Both adapters are pure copies: no I/O and no mutation of the source. The
//! `create_*` factories return `None` when there is nothing to adapt, so call
//! sites can branch on presence instead of inspecting a half-filled value.

use crate::exceptions::AreqError;
use crate::transport::{TransportError, TransportErrorKind, TransportRequest, TransportResponse};
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use std::time::Duration;

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Header mapping with case-insensitive lookup and stable insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace. A replaced entry keeps its position and the
    /// spelling of the key it was first inserted with.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn append_merged(&mut self, key: &str, value: &str) {
        match self.position(key) {
            Some(i) => {
                let existing = &mut self.entries[i].1;
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }
}

impl From<&HeaderMap> for Headers {
    /// Repeated header names collapse into one comma-joined entry.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map {
            headers.append_merged(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl Index<&str> for Headers {
    type Output = str;

    fn index(&self, key: &str) -> &str {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no header named {key:?}"),
        }
    }
}

fn header_pairs(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Low-level, incrementally readable view of a response body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    body: Bytes,
    position: usize,
    headers: Vec<(String, String)>,
    status: u16,
    reason: String,
}

impl RawResponse {
    pub fn new(
        body: Bytes,
        headers: Vec<(String, String)>,
        status: u16,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            body,
            position: 0,
            headers,
            status,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Every header line, repeated names included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Read up to `amt` bytes, or everything left when `amt` is `None`.
    pub fn read(&mut self, amt: Option<usize>) -> Bytes {
        let remaining = self.body.len() - self.position;
        let n = amt.map_or(remaining, |amt| amt.min(remaining));
        let chunk = self.body.slice(self.position..self.position + n);
        self.position += n;
        chunk
    }

    pub fn stream(&mut self, chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
        let size = chunk_size.max(1);
        std::iter::from_fn(move || {
            let chunk = self.read(Some(size));
            (!chunk.is_empty()).then_some(chunk)
        })
    }

    /// Bytes consumed so far.
    pub fn tell(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.body.len()
    }
}

/// The request a response or error was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreqRequest {
    method: String,
    url: String,
    headers: Headers,
}

impl AreqRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

impl From<&TransportRequest> for AreqRequest {
    fn from(request: &TransportRequest) -> Self {
        Self {
            method: request.method.as_str().to_uppercase(),
            url: request.url.to_string(),
            headers: Headers::from(&request.headers),
        }
    }
}

pub fn create_request(source: Option<&TransportRequest>) -> Option<AreqRequest> {
    source.map(AreqRequest::from)
}

/// A completed response exposing the read surface of a synchronous client.
#[derive(Debug, Clone)]
pub struct AreqResponse {
    status_code: u16,
    content: Bytes,
    headers: Headers,
    url: String,
    encoding: Option<String>,
    reason: String,
    elapsed: Duration,
    request: AreqRequest,
    raw: RawResponse,
    source: Arc<TransportResponse>,
}

impl AreqResponse {
    pub fn new(source: Arc<TransportResponse>) -> Self {
        let reason = source.reason_phrase().to_string();
        let raw = RawResponse::new(
            source.body.clone(),
            header_pairs(&source.headers),
            source.status.as_u16(),
            reason.clone(),
        );

        Self {
            status_code: source.status.as_u16(),
            content: source.body.clone(),
            headers: Headers::from(&source.headers),
            url: source.url.to_string(),
            encoding: source.encoding(),
            reason,
            elapsed: source.elapsed,
            request: AreqRequest::from(&source.request),
            raw,
            source,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// The body decoded with [`encoding`](Self::encoding), UTF-8 when unset.
    pub fn text(&self) -> String {
        decode(&self.content, self.encoding.as_deref()).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.content)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn request(&self) -> &AreqRequest {
        &self.request
    }

    pub fn ok(&self) -> bool {
        self.status_code < 400
    }

    pub fn is_redirect(&self) -> bool {
        self.headers.contains_key("location") && REDIRECT_STATUSES.contains(&self.status_code)
    }

    pub fn iter_content(&self, chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
        let size = chunk_size.max(1);
        let len = self.content.len();
        (0..len)
            .step_by(size)
            .map(move |start| self.content.slice(start..(start + size).min(len)))
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut RawResponse {
        &mut self.raw
    }

    /// The transport response this value was adapted from.
    pub fn transport_response(&self) -> &Arc<TransportResponse> {
        &self.source
    }

    /// Fail with an HTTP error for 4xx and 5xx statuses.
    pub fn raise_for_status(&self) -> Result<(), AreqError> {
        let class = match self.status_code {
            400..=499 => "Client Error",
            500..=599 => "Server Error",
            _ => return Ok(()),
        };

        let message = format!(
            "{} {}: {} for url: {}",
            self.status_code, class, self.reason, self.url
        );
        let cause = TransportError::new(TransportErrorKind::HttpStatus, message)
            .with_request(self.source.request.clone())
            .with_response(Arc::clone(&self.source));
        Err(AreqError::http(cause))
    }
}

impl fmt::Display for AreqResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}]>", self.status_code)
    }
}

pub fn create_response(source: Option<Arc<TransportResponse>>) -> Option<AreqResponse> {
    source.map(AreqResponse::new)
}

fn decode<'a>(bytes: &'a [u8], encoding: Option<&str>) -> Cow<'a, str> {
    let encoding = encoding
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text
}
