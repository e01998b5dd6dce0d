//! Outbound channel commands.
//!
//! Commands serialize to the wire schema
//! `{"action": "subscribe" | "unsubscribe" | "ping", "channel"?: "<name>"}`
//! and are wrapped in a frame by [`super::frame::encode`] before being
//! written to the connection.

use serde::{Deserialize, Serialize};

/// Logical outbound message for the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// Start receiving events published on a channel.
    Subscribe {
        /// Channel name, e.g. `rooms/1`.
        channel: String,
    },
    /// Stop receiving events from a channel.
    Unsubscribe {
        /// Channel name.
        channel: String,
    },
    /// Application-level liveness probe. No payload.
    Ping,
}

impl Command {
    /// Returns the wire name of the command's action.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::Ping => "ping",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_serializes_with_channel() {
        let cmd = Command::Subscribe {
            channel: "rooms/1".to_string(),
        };
        let Ok(json) = serde_json::to_value(&cmd) else {
            panic!("serialization failed");
        };
        assert_eq!(
            json,
            serde_json::json!({"action": "subscribe", "channel": "rooms/1"})
        );
    }

    #[test]
    fn unsubscribe_serializes_with_channel() {
        let cmd = Command::Unsubscribe {
            channel: "rooms/1".to_string(),
        };
        let Ok(json) = serde_json::to_value(&cmd) else {
            panic!("serialization failed");
        };
        assert_eq!(
            json,
            serde_json::json!({"action": "unsubscribe", "channel": "rooms/1"})
        );
    }

    #[test]
    fn ping_serializes_to_action_only() {
        let Ok(text) = serde_json::to_string(&Command::Ping) else {
            panic!("serialization failed");
        };
        assert_eq!(text, r#"{"action":"ping"}"#);
    }
}
