//! Async HTTP requests over reqwest, answered with response and error values
//! shaped like those of a conventional synchronous HTTP client.
//!
//! ```no_run
//! # async fn run() -> Result<(), areq::AreqError> {
//! let response = areq::get("https://httpbin.org/get", areq::RequestOptions::new()).await?;
//! response.raise_for_status()?;
//! println!("{} {}", response.status_code(), response.text());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod exceptions;
pub mod models;
pub mod transport;

pub use api::{delete, get, head, options, patch, post, put, request, request_with, AreqClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use exceptions::{category_of, classify, AreqError, CompatKind, ErrorCategory};
pub use models::{create_request, create_response, AreqRequest, AreqResponse, Headers, RawResponse};
pub use transport::{
    is_error_type, HttpTransport, RequestBody, RequestOptions, Transport, TransportError,
    TransportErrorKind, TransportRequest, TransportResponse,
};
pub use reqwest::Method;
