//! # ember-client
//!
//! Rust client SDK for the Ember document API: collection/document CRUD
//! over REST plus a minimal realtime channel client speaking a
//! simplified single-frame protocol over a plain TCP stream.
//!
//! ## Architecture
//!
//! ```text
//! EmberClient (client/)
//!     │
//!     ├── StoreClient (store/)          collection/document CRUD
//!     ├── RealtimeClient (realtime/)    connect · trigger
//!     │       ├── Connection            subscribe · unsubscribe · ping · read · close
//!     │       ├── frame                 wire-frame encode/decode
//!     │       └── command               JSON command schema
//!     │
//!     ├── HttpClient (http/)            request capability (reqwest)
//!     ├── Credentials (auth/)           bearer JWT or API key pair
//!     └── ClientConfig (config/)        explicit configuration value
//! ```
//!
//! The realtime client deliberately stays simple: one frame per read, no
//! continuation frames, no compression extensions, no protocol-level
//! ping/pong, no reconnection. See the module docs in [`realtime`] for
//! the protocol deviations that are preserved for compatibility with the
//! paired server.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod realtime;
pub mod store;

pub use auth::Credentials;
pub use client::EmberClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
