//! Realtime channel layer: frame codec, commands, connection handling.
//!
//! The channel speaks a simplified single-frame protocol over a plain
//! TCP stream: an HTTP Upgrade handshake, then JSON commands wrapped in
//! text frames. One connection carries one logical reader and one
//! logical writer, serialized by the caller.

pub mod command;
pub mod connection;
pub mod frame;

use std::sync::Arc;
use std::time::Duration;

pub use command::Command;
pub use connection::{Connection, Endpoint};

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;

/// Entry point for the realtime channel: connects to the websocket
/// endpoint and triggers channel events through the HTTP API.
///
/// Holds the websocket endpoint configuration and default credentials;
/// each [`RealtimeClient::connect`] call produces an independent
/// [`Connection`].
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    ws_url: String,
    credentials: Credentials,
    connect_timeout: Duration,
    http: Arc<HttpClient>,
}

impl RealtimeClient {
    /// Creates a realtime client from the SDK config and a shared HTTP
    /// client (used for event triggering).
    #[must_use]
    pub fn new(config: &ClientConfig, http: Arc<HttpClient>) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            credentials: config.credentials.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            http,
        }
    }

    /// Connects using the configured default credentials.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::InvalidUrl`] for an unparseable
    /// websocket URL, [`crate::error::ClientError::Connect`] when the
    /// socket cannot be opened, [`crate::error::ClientError::Handshake`]
    /// when the upgrade is refused.
    pub async fn connect(&self) -> ClientResult<Connection> {
        self.connect_with(&self.credentials).await
    }

    /// Connects with explicit credentials, overriding the configured
    /// defaults for this connection only.
    ///
    /// # Errors
    ///
    /// Same as [`RealtimeClient::connect`].
    pub async fn connect_with(&self, credentials: &Credentials) -> ClientResult<Connection> {
        let endpoint = Endpoint::parse(&self.ws_url)?;
        Connection::connect(endpoint, credentials, self.connect_timeout).await
    }

    /// Publishes an event to a channel via the HTTP API
    /// (`POST /api/realtime/trigger`), fanning it out to subscribers.
    ///
    /// Returns the response data.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Http`] on a failure status,
    /// [`crate::error::ClientError::Transport`] on a transport fault.
    pub async fn trigger(
        &self,
        channel: &str,
        event: &str,
        data: serde_json::Value,
    ) -> ClientResult<serde_json::Value> {
        let body = serde_json::json!({
            "channel": channel,
            "event": event,
            "data": data,
        });
        let response = match self.http.post("/api/realtime/trigger", body).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(channel, event, %err, "failed to trigger event");
                return Err(err);
            }
        };

        tracing::info!(channel, event, "channel event triggered");
        Ok(response.data)
    }
}
