//! JSON-RPC over a lazily opened WebSocket connection

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use xlend_core::MessagingError;

/// Timeout for connecting or for a single request/response exchange
pub const WS_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Serialize)]
struct WsRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WsResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<WsErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WsErrorBody {
    code: i64,
    message: String,
}

/// One messaging endpoint. The connection is opened on first use and
/// dropped after a transport failure so the next request reconnects.
pub struct WsEndpoint {
    url: String,
    conn: Mutex<Option<WsStream>>,
    request_id: AtomicU64,
}

impl WsEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: Mutex::new(None),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    async fn connect(&self) -> Result<WsStream, MessagingError> {
        let (stream, _) = tokio::time::timeout(WS_REQUEST_TIMEOUT, connect_async(self.url.as_str()))
            .await
            .map_err(|_| MessagingError::Unreachable {
                url: self.url.clone(),
                reason: format!("connect timed out after {}s", WS_REQUEST_TIMEOUT.as_secs()),
            })?
            .map_err(|e| MessagingError::Unreachable {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(url = %self.url, "Messaging endpoint connected");
        Ok(stream)
    }

    /// Call a method. `null` results come back as `None`.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<Option<R>, MessagingError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect().await?);
        }
        let Some(stream) = guard.as_mut() else {
            return Err(MessagingError::ConnectionClosed);
        };

        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_string(&WsRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        })
        .map_err(|e| MessagingError::ParseError(e.to_string()))?;

        let exchange = tokio::time::timeout(WS_REQUEST_TIMEOUT, exchange(stream, body, id)).await;
        let response = match exchange {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                *guard = None;
                return Err(e);
            }
            Err(_) => {
                *guard = None;
                return Err(MessagingError::Timeout {
                    secs: WS_REQUEST_TIMEOUT.as_secs(),
                });
            }
        };
        drop(guard);

        if let Some(err) = response.error {
            return Err(MessagingError::JsonRpc {
                code: err.code,
                message: err.message,
            });
        }
        match response.result {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| MessagingError::ParseError(format!("{}: {}", method, e))),
        }
    }
}

/// Send a request and read frames until the response with the same id
async fn exchange(stream: &mut WsStream, body: String, id: u64) -> Result<WsResponse, MessagingError> {
    stream
        .send(Message::Text(body.into()))
        .await
        .map_err(|_| MessagingError::ConnectionClosed)?;

    while let Some(frame) = stream.next().await {
        let text = match frame.map_err(|_| MessagingError::ConnectionClosed)? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(MessagingError::ConnectionClosed),
            // Pings are answered by tungstenite; binary frames are not part of the protocol
            _ => continue,
        };
        let response: WsResponse = serde_json::from_str(text.as_str())
            .map_err(|e| MessagingError::ParseError(e.to_string()))?;
        if response.id == Some(id) {
            return Ok(response);
        }
        tracing::trace!(?response.id, expected = id, "Skipping unrelated frame");
    }
    Err(MessagingError::ConnectionClosed)
}
