//! Connection establishment and the live channel handle.
//!
//! [`Connection::connect`] opens a plain TCP stream, performs the HTTP
//! Upgrade handshake, and returns a [`Connection`] owning both stream
//! halves. The handle exposes the command channel (subscribe /
//! unsubscribe / ping), the polling receiver ([`Connection::read`]), and
//! [`Connection::close`].
//!
//! The handle is not safe for concurrent writers, nor for a concurrent
//! writer and reader — exclusive `&mut` access enforces the caller-side
//! serialization the protocol model assumes. There are no internal
//! threads, queues, or retries.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use url::Url;

use super::command::Command;
use super::frame;
use crate::auth::Credentials;
use crate::error::{ClientError, ClientResult};

/// Fallback host when the websocket URL omits one.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Fallback port when the websocket URL omits one.
const DEFAULT_PORT: u16 = 9090;

/// Fallback upgrade path when the websocket URL omits one.
const DEFAULT_PATH: &str = "/websocket";

/// Upper bound for a single bounded read in [`Connection::read`].
const READ_BUFFER_SIZE: usize = 8192;

/// Parsed websocket endpoint: scheme, host, port, and upgrade path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// URL scheme (`ws` in practice; not otherwise interpreted).
    pub scheme: String,
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Request path for the upgrade request.
    pub path: String,
}

impl Endpoint {
    /// Parses a websocket URL, applying the defaults `127.0.0.1`, port
    /// 9090, and path `/websocket` for missing components. A bare `/`
    /// path also falls back to `/websocket`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the string is not a
    /// parseable absolute URL.
    pub fn parse(ws_url: &str) -> ClientResult<Self> {
        let url = Url::parse(ws_url).map_err(|err| ClientError::InvalidUrl {
            url: ws_url.to_string(),
            reason: err.to_string(),
        })?;

        let scheme = url.scheme().to_string();
        let host = url.host_str().unwrap_or(DEFAULT_HOST).to_string();
        let port = url.port().unwrap_or(DEFAULT_PORT);
        let path = match url.path() {
            "" | "/" => DEFAULT_PATH.to_string(),
            other => other.to_string(),
        };

        Ok(Self {
            scheme,
            host,
            port,
            path,
        })
    }
}

/// An established realtime channel connection.
///
/// Owns both halves of the underlying TCP stream exclusively; dropping
/// the handle releases the socket on every path, including errors during
/// use. Obtained from [`Connection::connect`] or
/// [`super::RealtimeClient::connect`].
#[derive(Debug)]
pub struct Connection {
    endpoint: Endpoint,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    closed: bool,
}

impl Connection {
    /// Opens a TCP connection to the endpoint and performs the upgrade
    /// handshake.
    ///
    /// The TCP connect is bounded by `connect_timeout`. The handshake
    /// sends a `GET <path> HTTP/1.1` upgrade request with a fresh
    /// base64-encoded 16-byte key and the resolved credential headers,
    /// then reads the response line by line until a blank line or EOF.
    /// Any response whose status line does not contain `101` fails the
    /// handshake; the socket is released by drop on every failure path.
    ///
    /// # Errors
    ///
    /// [`ClientError::Connect`] when the socket cannot be opened within
    /// the timeout, [`ClientError::Handshake`] when the peer answers
    /// with a non-101 response (the raw response text is carried for
    /// diagnosis).
    pub async fn connect(
        endpoint: Endpoint,
        credentials: &Credentials,
        connect_timeout: Duration,
    ) -> ClientResult<Self> {
        let stream = tokio::time::timeout(
            connect_timeout,
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await
        .map_err(|_| ClientError::connect(endpoint.host.as_str(), endpoint.port, "connect timeout"))?
        .map_err(|err| ClientError::connect(endpoint.host.as_str(), endpoint.port, err.to_string()))?;

        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = write_half;

        let request = upgrade_request(&endpoint, credentials);
        writer
            .write_all(request.as_bytes())
            .await
            .map_err(|err| ClientError::connect(endpoint.host.as_str(), endpoint.port, err.to_string()))?;

        let response = read_handshake_response(&mut reader)
            .await
            .map_err(|err| ClientError::connect(endpoint.host.as_str(), endpoint.port, err.to_string()))?;

        let status_line = response.lines().next().unwrap_or_default();
        if !status_line.contains("101") {
            return Err(ClientError::Handshake { response });
        }

        tracing::info!(
            host = %endpoint.host,
            port = endpoint.port,
            "websocket connected"
        );

        Ok(Self {
            endpoint,
            reader,
            writer,
            closed: false,
        })
    }

    /// Returns the endpoint this connection was established against.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Subscribes to a channel.
    ///
    /// Writes a single frame and returns without waiting for an
    /// acknowledgment; any server reply arrives later through
    /// [`Connection::read`].
    ///
    /// # Errors
    ///
    /// [`ClientError::Send`] on a write fault.
    pub async fn subscribe(&mut self, channel: &str) -> ClientResult<()> {
        let command = Command::Subscribe {
            channel: channel.to_string(),
        };
        if let Err(err) = self.send(&command).await {
            tracing::error!(channel, %err, "failed to subscribe to channel");
            return Err(err);
        }
        tracing::info!(channel, "subscribed to channel");
        Ok(())
    }

    /// Unsubscribes from a channel.
    ///
    /// # Errors
    ///
    /// [`ClientError::Send`] on a write fault.
    pub async fn unsubscribe(&mut self, channel: &str) -> ClientResult<()> {
        let command = Command::Unsubscribe {
            channel: channel.to_string(),
        };
        if let Err(err) = self.send(&command).await {
            tracing::error!(channel, %err, "failed to unsubscribe from channel");
            return Err(err);
        }
        tracing::info!(channel, "unsubscribed from channel");
        Ok(())
    }

    /// Sends an application-level ping.
    ///
    /// # Errors
    ///
    /// [`ClientError::Send`] on a write fault.
    pub async fn ping(&mut self) -> ClientResult<()> {
        if let Err(err) = self.send(&Command::Ping).await {
            tracing::error!(%err, "failed to send ping");
            return Err(err);
        }
        Ok(())
    }

    /// Performs one bounded read and decodes it into a message.
    ///
    /// Polling primitive: exactly one read of up to 8192 bytes, bounded
    /// by `timeout`. Returns `None` on timeout, an empty or faulted
    /// read, or a frame that does not fit in the single read — never an
    /// error. A decoded frame that fails JSON parsing also yields `None`
    /// and logs a warning carrying the raw decoded text; the other
    /// absent cases stay silent.
    pub async fn read(&mut self, timeout: Duration) -> Option<serde_json::Value> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let n = match tokio::time::timeout(timeout, self.reader.read(&mut buf)).await {
            Err(_) => return None,
            Ok(Err(_)) | Ok(Ok(0)) => return None,
            Ok(Ok(n)) => n,
        };
        buf.truncate(n);

        let payload = frame::decode(&buf)?;
        match serde_json::from_slice(&payload) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::warn!(
                    %err,
                    raw = %String::from_utf8_lossy(&payload),
                    "failed to parse inbound message"
                );
                None
            }
        }
    }

    /// Closes the connection. Idempotent.
    ///
    /// The first call shuts down the write half and logs; later calls
    /// are no-ops. Dropping the handle releases the socket regardless.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.writer.shutdown().await;
        tracing::info!(
            host = %self.endpoint.host,
            port = self.endpoint.port,
            "websocket connection closed"
        );
    }

    /// Frame-encodes a command and writes it out synchronously.
    async fn send(&mut self, command: &Command) -> ClientResult<()> {
        let json = serde_json::to_vec(command)?;
        let wire = frame::encode(&json);
        self.writer
            .write_all(&wire)
            .await
            .map_err(|err| ClientError::Send {
                action: command.action(),
                reason: err.to_string(),
            })
    }
}

/// Builds the HTTP/1.1 upgrade request for the endpoint.
fn upgrade_request(endpoint: &Endpoint, credentials: &Credentials) -> String {
    let key: [u8; 16] = rand::rng().random();
    let key = BASE64.encode(key);

    let mut lines = vec![
        format!("GET {} HTTP/1.1", endpoint.path),
        format!("Host: {}:{}", endpoint.host, endpoint.port),
        "Upgrade: websocket".to_string(),
        "Connection: Upgrade".to_string(),
        format!("Sec-WebSocket-Key: {key}"),
        "Sec-WebSocket-Version: 13".to_string(),
    ];
    for (name, value) in credentials.header_pairs() {
        lines.push(format!("{name}: {value}"));
    }

    lines.join("\r\n") + "\r\n\r\n"
}

/// Reads the handshake response line by line until a blank line or EOF.
async fn read_handshake_response(
    reader: &mut BufReader<OwnedReadHalf>,
) -> std::io::Result<String> {
    let mut response = String::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break;
        }
        response.push_str(&line);
        if line == "\r\n" || line == "\n" {
            break;
        }
    }
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const SWITCHING_PROTOCOLS: &str = "HTTP/1.1 101 Switching Protocols\r\n\r\n";

    /// Builds a masked text frame the way a peer would.
    fn peer_masked_frame(payload: &[u8], key: [u8; 4]) -> Vec<u8> {
        let mut wire = vec![0x81, 0x80 | payload.len() as u8];
        wire.extend_from_slice(&key);
        wire.extend(
            payload
                .iter()
                .zip(key.iter().cycle())
                .map(|(byte, k)| byte ^ k),
        );
        wire
    }

    /// Reads bytes from the peer side until the header terminator.
    async fn read_request_head(stream: &mut TcpStream) -> String {
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            let Ok(n) = stream.read(&mut byte).await else {
                break;
            };
            if n == 0 {
                break;
            }
            head.extend_from_slice(&byte);
        }
        String::from_utf8_lossy(&head).into_owned()
    }

    fn local_endpoint(listener: &TcpListener) -> Endpoint {
        let Ok(addr) = listener.local_addr() else {
            panic!("listener has no local addr");
        };
        let Ok(endpoint) = Endpoint::parse(&format!("ws://{addr}/websocket")) else {
            panic!("endpoint parse failed");
        };
        endpoint
    }

    #[test]
    fn endpoint_parse_applies_defaults() {
        let Ok(endpoint) = Endpoint::parse("ws://example.com") else {
            panic!("parse failed");
        };
        assert_eq!(endpoint.scheme, "ws");
        assert_eq!(endpoint.host, "example.com");
        assert_eq!(endpoint.port, 9090);
        assert_eq!(endpoint.path, "/websocket");
    }

    #[test]
    fn endpoint_parse_honors_explicit_parts() {
        let Ok(endpoint) = Endpoint::parse("ws://10.0.0.5:8800/realtime") else {
            panic!("parse failed");
        };
        assert_eq!(endpoint.host, "10.0.0.5");
        assert_eq!(endpoint.port, 8800);
        assert_eq!(endpoint.path, "/realtime");
    }

    #[test]
    fn endpoint_parse_rejects_garbage() {
        let result = Endpoint::parse("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn handshake_success_yields_open_connection() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        let peer = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            let head = read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            head
        });

        let credentials = Credentials::bearer("tok-1");
        let result =
            Connection::connect(endpoint, &credentials, Duration::from_secs(5)).await;
        assert!(result.is_ok());

        let Ok(head) = peer.await else {
            panic!("peer task failed");
        };
        assert!(head.starts_with("GET /websocket HTTP/1.1\r\n"));
        assert!(head.contains("Upgrade: websocket\r\n"));
        assert!(head.contains("Connection: Upgrade\r\n"));
        assert!(head.contains("Sec-WebSocket-Version: 13\r\n"));
        assert!(head.contains("Sec-WebSocket-Key: "));
        assert!(head.contains("Authorization: Bearer tok-1\r\n"));
    }

    #[tokio::test]
    async fn handshake_sends_api_key_headers_without_jwt() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        let peer = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            let head = read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            head
        });

        let credentials = Credentials::api_key("k-9", "https://example.com");
        let result =
            Connection::connect(endpoint, &credentials, Duration::from_secs(5)).await;
        assert!(result.is_ok());

        let Ok(head) = peer.await else {
            panic!("peer task failed");
        };
        assert!(head.contains("X-API-Key: k-9\r\n"));
        assert!(head.contains("X-Website-Url: https://example.com\r\n"));
        assert!(!head.contains("Authorization:"));
    }

    #[tokio::test]
    async fn handshake_rejection_carries_raw_response() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n")
                .await;
        });

        let result = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await;
        let Err(ClientError::Handshake { response }) = result else {
            panic!("expected handshake error");
        };
        assert!(response.contains("400 Bad Request"));
    }

    #[tokio::test]
    async fn connect_refused_yields_connect_error() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);
        drop(listener);

        let result = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }

    #[tokio::test]
    async fn subscribe_writes_decodable_command_frame() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        let peer = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            let mut buf = vec![0u8; 1024];
            let Ok(n) = stream.read(&mut buf).await else {
                panic!("frame read failed");
            };
            buf.truncate(n);
            buf
        });

        let Ok(mut conn) = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await
        else {
            panic!("connect failed");
        };
        let Ok(()) = conn.subscribe("rooms/1").await else {
            panic!("subscribe failed");
        };

        let Ok(wire) = peer.await else {
            panic!("peer task failed");
        };
        let Some(payload) = frame::decode(&wire) else {
            panic!("peer could not decode frame");
        };
        let Ok(message) = serde_json::from_slice::<serde_json::Value>(&payload) else {
            panic!("payload is not json");
        };
        assert_eq!(
            message,
            serde_json::json!({"action": "subscribe", "channel": "rooms/1"})
        );
    }

    #[tokio::test]
    async fn read_decodes_masked_peer_message() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            let wire = peer_masked_frame(
                br#"{"event":"created","channel":"rooms/1"}"#,
                [0x01, 0x02, 0x03, 0x04],
            );
            let _ = stream.write_all(&wire).await;
            // Hold the socket open until the client has read.
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let Ok(mut conn) = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await
        else {
            panic!("connect failed");
        };

        let message = conn.read(Duration::from_secs(5)).await;
        assert_eq!(
            message,
            Some(serde_json::json!({"event": "created", "channel": "rooms/1"}))
        );
    }

    #[tokio::test]
    async fn read_times_out_quietly_when_peer_is_silent() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let Ok(mut conn) = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await
        else {
            panic!("connect failed");
        };

        let message = conn.read(Duration::from_millis(100)).await;
        assert_eq!(message, None);
    }

    #[tokio::test]
    async fn read_yields_none_for_malformed_json() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let Ok(()) = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await else {
                panic!("write failed");
            };
            let _ = stream.write_all(&frame::encode(b"not json at all")).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        });

        let Ok(mut conn) = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await
        else {
            panic!("connect failed");
        };

        let message = conn.read(Duration::from_secs(5)).await;
        assert_eq!(message, None);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let endpoint = local_endpoint(&listener);

        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            read_request_head(&mut stream).await;
            let _ = stream.write_all(SWITCHING_PROTOCOLS.as_bytes()).await;
        });

        let Ok(mut conn) = Connection::connect(
            endpoint,
            &Credentials::default(),
            Duration::from_secs(5),
        )
        .await
        else {
            panic!("connect failed");
        };

        conn.close().await;
        conn.close().await;
    }
}
