//! Verb functions: open a transport, send, adapt the result.

use crate::config::ClientConfig;
use crate::exceptions::{classify, AreqError};
use crate::models::{create_response, AreqResponse};
use crate::transport::{
    HttpTransport, RequestOptions, Transport, TransportError, TransportErrorKind,
};
use reqwest::Method;
use std::sync::Arc;

/// Holds the defaults applied to every call. Each call still opens and drops
/// its own transport.
#[derive(Debug, Clone, Default)]
pub struct AreqClient {
    config: ClientConfig,
}

impl AreqClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        request_with::<HttpTransport>(&self.config, method, url, options).await
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
        self.request(Method::GET, url, options).await
    }

    pub async fn options(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        self.request(Method::OPTIONS, url, options).await
    }

    /// Redirects are not followed unless the caller opts in.
    pub async fn head(
        &self,
        url: &str,
        mut options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        options.allow_redirects.get_or_insert(false);
        self.request(Method::HEAD, url, options).await
    }

    pub async fn post(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        self.request(Method::POST, url, options).await
    }

    pub async fn put(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        self.request(Method::PUT, url, options).await
    }

    pub async fn patch(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        self.request(Method::PATCH, url, options).await
    }

    pub async fn delete(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<AreqResponse, AreqError> {
        self.request(Method::DELETE, url, options).await
    }
}

/// Run one request over transport `T` and adapt the outcome.
///
/// The transport lives only for this call and is dropped on every exit path.
/// Transport failures come back classified; a transport that succeeds
/// without a response is reported as a base error.
pub async fn request_with<T: Transport>(
    config: &ClientConfig,
    method: Method,
    url: &str,
    options: RequestOptions,
) -> Result<AreqResponse, AreqError> {
    let transport = T::open(config, &options).map_err(classify)?;

    let outcome = transport.send(method.clone(), url, options).await;
    drop(transport);

    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            let err = classify(err);
            tracing::warn!(%method, url, category = ?err.category(), "request failed: {}", err);
            return Err(err);
        }
    };

    let Some(response) = create_response(response.map(Arc::new)) else {
        tracing::error!(%method, url, "transport returned no response");
        return Err(AreqError::new(TransportError::new(
            TransportErrorKind::Http,
            "transport response should never be None from a successful request",
        )));
    };

    tracing::debug!(
        %method,
        url = response.url(),
        status = response.status_code(),
        elapsed_ms = response.elapsed().as_millis() as u64,
        "request completed"
    );

    Ok(response)
}

pub async fn request(
    method: Method,
    url: &str,
    options: RequestOptions,
) -> Result<AreqResponse, AreqError> {
    AreqClient::default().request(method, url, options).await
}

pub async fn get(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().get(url, options).await
}

pub async fn options(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().options(url, options).await
}

pub async fn head(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().head(url, options).await
}

pub async fn post(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().post(url, options).await
}

pub async fn put(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().put(url, options).await
}

pub async fn patch(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().patch(url, options).await
}

pub async fn delete(url: &str, options: RequestOptions) -> Result<AreqResponse, AreqError> {
    AreqClient::default().delete(url, options).await
}
