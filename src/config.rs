//! SDK configuration.
//!
//! Follows 12-factor style: [`ClientConfig::from_env`] reads environment
//! variables (or a `.env` file via `dotenvy`) once and produces a plain
//! value. Every component takes the resulting config in its constructor;
//! nothing performs an ambient lookup after construction.

use crate::auth::Credentials;

/// Default base URL of the Ember HTTP API.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9090";

/// Default websocket URL of the realtime endpoint.
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:9090/websocket";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default TCP connect timeout for the realtime channel, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Top-level SDK configuration.
///
/// Built once (either literally or via [`ClientConfig::from_env`]) and
/// passed into [`crate::client::EmberClient::new`] or the individual
/// component constructors.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Ember HTTP API (e.g. `http://127.0.0.1:9090`).
    pub api_url: String,

    /// Websocket URL of the realtime endpoint
    /// (e.g. `ws://127.0.0.1:9090/websocket`).
    pub ws_url: String,

    /// Default credentials applied to HTTP requests and the realtime
    /// handshake. May be empty for unauthenticated backends.
    pub credentials: Credentials,

    /// Timeout in seconds for HTTP requests.
    pub timeout_secs: u64,

    /// Timeout in seconds for opening the realtime TCP connection.
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the documented defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// Recognized keys: `EMBER_API_URL`, `EMBER_WS_URL`, `EMBER_JWT`,
    /// `EMBER_API_KEY`, `EMBER_WEBSITE_URL`, `EMBER_TIMEOUT_SECS`,
    /// `EMBER_CONNECT_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("EMBER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let ws_url = std::env::var("EMBER_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());

        let credentials = Credentials {
            jwt: std::env::var("EMBER_JWT").ok(),
            api_key: std::env::var("EMBER_API_KEY").ok(),
            website_url: std::env::var("EMBER_WEBSITE_URL").ok(),
        };

        let timeout_secs = parse_env("EMBER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let connect_timeout_secs =
            parse_env("EMBER_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS);

        Self {
            api_url,
            ws_url,
            credentials,
            timeout_secs,
            connect_timeout_secs,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            credentials: Credentials::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
