//! HTTP request capability.
//!
//! [`HttpClient`] wraps a [`reqwest::Client`] with the API base URL,
//! default credential headers, and the configured timeout. All REST
//! passthrough and event triggering goes through
//! [`HttpClient::request`]; failures surface as
//! [`ClientError::Http`] with the response's `error` field when present.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Options for a single HTTP request.
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub json: Option<serde_json::Value>,
    /// Per-request timeout override; the configured default applies
    /// when absent.
    pub timeout: Option<Duration>,
}

/// Response envelope: status code, parsed body, and response headers.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body parsed as JSON; non-JSON bodies surface as a JSON
    /// string value.
    pub data: serde_json::Value,
    /// Response headers (non-UTF-8 values omitted).
    pub headers: HashMap<String, String>,
}

/// HTTP client for the Ember API.
///
/// Cheap to clone is not a goal here — share it behind an `Arc`, as
/// [`crate::client::EmberClient`] does.
#[derive(Debug)]
pub struct HttpClient {
    base_url: String,
    default_headers: Vec<(&'static str, String)>,
    inner: reqwest::Client,
}

impl HttpClient {
    /// Builds an HTTP client from the SDK config: base URL, default
    /// credential headers, and request timeout.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] when the underlying client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.api_url.clone(),
            default_headers: config.credentials.header_pairs(),
            inner,
        })
    }

    /// Performs one HTTP request against the API.
    ///
    /// `path` is joined to the configured base URL unless it is already
    /// absolute. Success responses are returned as an [`HttpResponse`]
    /// and traced at debug level.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] for a failure status (the message prefers
    /// the body's `error` field), [`ClientError::Transport`] for
    /// request-level faults.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<HttpResponse> {
        let url = self.resolve_url(path);

        let mut builder = self.inner.request(method.clone(), &url);
        for (name, value) in &self.default_headers {
            builder = builder.header(*name, value.as_str());
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(json) = &options.json {
            builder = builder.json(json);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        let text = response.text().await?;
        let data: serde_json::Value =
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        if !status.is_success() {
            let message = data
                .get("error")
                .and_then(|v| v.as_str())
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| data.to_string());
            tracing::error!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                %message,
                "http request failed"
            );
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "http request"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            data,
            headers,
        })
    }

    /// `GET` with query parameters.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn get(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ClientResult<HttpResponse> {
        self.request(
            Method::GET,
            path,
            RequestOptions {
                query,
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn post(&self, path: &str, json: serde_json::Value) -> ClientResult<HttpResponse> {
        self.request(
            Method::POST,
            path,
            RequestOptions {
                json: Some(json),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn put(&self, path: &str, json: serde_json::Value) -> ClientResult<HttpResponse> {
        self.request(
            Method::PUT,
            path,
            RequestOptions {
                json: Some(json),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// `DELETE` with no body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn delete(&self, path: &str) -> ClientResult<HttpResponse> {
        self.request(Method::DELETE, path, RequestOptions::default())
            .await
    }

    /// Joins a path to the base URL, passing absolute URLs through.
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
