//! Top-level SDK wiring.
//!
//! [`EmberClient`] builds the HTTP client once from a [`ClientConfig`]
//! and shares it across the store and realtime layers. No globals: all
//! configuration flows through constructors.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::realtime::RealtimeClient;
use crate::store::StoreClient;

/// Facade over the SDK's components.
///
/// ```no_run
/// # async fn run() -> Result<(), ember_client::error::ClientError> {
/// use std::time::Duration;
///
/// let client = ember_client::client::EmberClient::from_env()?;
/// let mut conn = client.realtime().connect().await?;
/// conn.subscribe("rooms/1").await?;
/// while let Some(message) = conn.read(Duration::from_secs(30)).await {
///     println!("{message}");
/// }
/// conn.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EmberClient {
    config: ClientConfig,
    http: Arc<HttpClient>,
    store: StoreClient,
    realtime: RealtimeClient,
}

impl EmberClient {
    /// Wires up all components from an explicit config value.
    ///
    /// # Errors
    ///
    /// [`crate::error::ClientError::Transport`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Arc::new(HttpClient::new(&config)?);
        let store = StoreClient::new(Arc::clone(&http));
        let realtime = RealtimeClient::new(&config, Arc::clone(&http));

        Ok(Self {
            config,
            http,
            store,
            realtime,
        })
    }

    /// Loads [`ClientConfig::from_env`] and wires up the client.
    ///
    /// # Errors
    ///
    /// Same as [`EmberClient::new`].
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Raw HTTP request capability.
    #[must_use]
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Collection/document CRUD.
    #[must_use]
    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Realtime channel client.
    #[must_use]
    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }
}
