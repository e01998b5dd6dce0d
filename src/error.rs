//! SDK error types.
//!
//! [`ClientError`] is the central error type for the SDK. Connection
//! establishment and command writes fail fast with no retry; frame
//! decode and JSON parse problems inside [`crate::realtime::Connection::read`]
//! never surface here — they collapse into an absent result and are
//! reported through the log sink instead.

/// Result alias for SDK operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Central error enum for all SDK operations.
///
/// Variants carry enough context (host, port, action) for the caller to
/// diagnose a failure; richer diagnostics go to the `tracing` sink at
/// the failure site.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The websocket URL could not be parsed.
    #[error("invalid websocket url {url}: {reason}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The TCP connection could not be opened (refusal or timeout).
    #[error("failed to connect to {host}:{port}: {reason}")]
    Connect {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// Underlying I/O diagnostic, or `"connect timeout"`.
        reason: String,
    },

    /// The upgrade handshake was answered with something other than 101.
    #[error("websocket handshake failed: {response}")]
    Handshake {
        /// Raw response text received from the peer.
        response: String,
    },

    /// A command write faulted on an open connection.
    #[error("failed to send {action} command: {reason}")]
    Send {
        /// Wire name of the command (`subscribe`, `unsubscribe`, `ping`).
        action: &'static str,
        /// Underlying I/O diagnostic.
        reason: String,
    },

    /// The remote API answered with a failure status.
    #[error("http request failed with status {status}: {message}")]
    Http {
        /// HTTP status code of the response.
        status: u16,
        /// Error message from the response body, or the raw body text.
        message: String,
    },

    /// Request-level transport failure (DNS, TLS, connect, body read).
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Outbound command or payload serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Creates a [`ClientError::Connect`] from host/port context and a reason.
    pub(crate) fn connect(host: impl Into<String>, port: u16, reason: impl Into<String>) -> Self {
        Self::Connect {
            host: host.into(),
            port,
            reason: reason.into(),
        }
    }
}
