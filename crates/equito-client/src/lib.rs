//! equito-client: delivery proofs from the Equito messaging network
//!
//! Proof retrieval has two phases. The client first polls for the message's
//! confirmation time, which becomes available once validators have observed
//! the source transaction, then collects the validator signatures. The proof
//! handed to the destination router is the concatenation of those signatures.
//!
//! Each phase goes to the primary endpoint first and falls back to the archive
//! endpoint when the primary one fails.

pub mod ws;

use std::time::Duration;

use alloy_primitives::{Bytes, B256};
use serde::{de::DeserializeOwned, Serialize};
use xlend_core::{ChainSelector, MessagingConfig, MessagingError};

pub use ws::{WsEndpoint, WS_REQUEST_TIMEOUT};

pub const METHOD_CONFIRMATION_TIME: &str = "equito_getConfirmationTime";
pub const METHOD_SIGNATURES: &str = "equito_getSignatures";

/// Result type for messaging operations
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Parameters identifying a message awaiting a proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub message_hash: B256,
    pub chain_selector: ChainSelector,
    /// Window start, in milliseconds since the Unix epoch
    pub from_timestamp: u64,
}

/// Equito client over a primary and an archive WebSocket endpoint
pub struct EquitoClient {
    primary: WsEndpoint,
    archive: WsEndpoint,
    poll_interval: Duration,
    max_polls: u32,
}

impl EquitoClient {
    pub fn new(config: &MessagingConfig) -> Self {
        Self {
            primary: WsEndpoint::new(config.ws_endpoint.clone()),
            archive: WsEndpoint::new(config.archive_ws_endpoint.clone()),
            poll_interval: Duration::from_millis(config.proof_poll_ms),
            max_polls: config.proof_max_polls.max(1),
        }
    }

    /// Query the primary endpoint, falling back to the archive on failure
    async fn query<P, R>(&self, method: &str, params: P) -> Result<Option<R>>
    where
        P: Serialize + Clone,
        R: DeserializeOwned,
    {
        match self.primary.request(method, params.clone()).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(
                    method,
                    url = %self.primary.url(),
                    error = %e,
                    "Primary messaging endpoint failed, trying archive"
                );
                self.archive.request(method, params).await
            }
        }
    }

    /// Confirmation time of the message, once validators have seen it
    pub async fn confirmation_time(&self, request: &ProofRequest) -> Result<Option<u64>> {
        self.query(METHOD_CONFIRMATION_TIME, [*request]).await
    }

    /// Validator signatures collected for the message
    pub async fn signatures(&self, request: &ProofRequest) -> Result<Vec<Bytes>> {
        Ok(self
            .query(METHOD_SIGNATURES, [*request])
            .await?
            .unwrap_or_default())
    }

    /// Wait for confirmation and assemble the delivery proof
    pub async fn request_proof(&self, request: ProofRequest) -> Result<Bytes> {
        let hash = request.message_hash.to_string();
        tracing::info!(
            message_hash = %hash,
            chain_selector = request.chain_selector,
            from_timestamp = request.from_timestamp,
            "Requesting delivery proof"
        );

        let mut polls = 0u32;
        let confirmed_at = loop {
            polls += 1;
            if let Some(time) = self.confirmation_time(&request).await? {
                break time;
            }
            if polls >= self.max_polls {
                return Err(MessagingError::ProofUnavailable { message_hash: hash });
            }
            tokio::time::sleep(self.poll_interval).await;
        };
        tracing::debug!(message_hash = %hash, confirmed_at, polls, "Message confirmed");

        let signatures = self.signatures(&request).await?;
        let proof = assemble_proof(&signatures)
            .ok_or(MessagingError::ProofUnavailable { message_hash: hash })?;
        tracing::info!(signatures = signatures.len(), proof_len = proof.len(), "Proof assembled");
        Ok(proof)
    }
}

/// Concatenate signatures in the order the network returned them
pub fn assemble_proof(signatures: &[Bytes]) -> Option<Bytes> {
    if signatures.is_empty() {
        return None;
    }
    Some(
        signatures
            .iter()
            .flat_map(|s| s.iter().copied())
            .collect::<Vec<u8>>()
            .into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    /// Messaging node that confirms a message after `confirm_after` polls
    async fn spawn_node(confirm_after: usize, signatures: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let signatures = signatures.clone();
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    let mut polls = 0usize;
                    while let Some(Ok(Message::Text(text))) = ws.next().await {
                        let req: Value = serde_json::from_str(text.as_str()).unwrap();
                        assert_eq!(req["params"][0]["chainSelector"], 1004);
                        let result = match req["method"].as_str().unwrap_or_default() {
                            METHOD_CONFIRMATION_TIME => {
                                polls += 1;
                                if polls > confirm_after {
                                    json!(1_700_000_060_000u64)
                                } else {
                                    Value::Null
                                }
                            }
                            METHOD_SIGNATURES => json!(signatures),
                            _ => Value::Null,
                        };
                        // Unrelated notification first, then the response
                        let note = json!({"jsonrpc": "2.0", "method": "equito_heartbeat"});
                        ws.send(Message::Text(note.to_string().into())).await.unwrap();
                        let response = json!({"jsonrpc": "2.0", "id": req["id"], "result": result});
                        ws.send(Message::Text(response.to_string().into())).await.unwrap();
                    }
                });
            }
        });
        format!("ws://{}", addr)
    }

    fn client(primary: String, archive: String) -> EquitoClient {
        EquitoClient::new(&MessagingConfig {
            ws_endpoint: primary,
            archive_ws_endpoint: archive,
            proof_poll_ms: 5,
            proof_max_polls: 5,
        })
    }

    fn request() -> ProofRequest {
        ProofRequest {
            message_hash: B256::repeat_byte(0x42),
            chain_selector: 1004,
            from_timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_assemble_proof_concatenates_in_order() {
        let proof = assemble_proof(&[
            Bytes::from(vec![1u8, 2]),
            Bytes::from(vec![3u8]),
        ])
        .unwrap();
        assert_eq!(proof.as_ref(), &[1, 2, 3]);
        assert!(assemble_proof(&[]).is_none());
    }

    #[test]
    fn test_proof_request_params() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["chainSelector"], 1004);
        assert_eq!(json["fromTimestamp"], 1_700_000_000_000u64);
        assert_eq!(
            json["messageHash"],
            "0x4242424242424242424242424242424242424242424242424242424242424242"
        );
    }

    #[tokio::test]
    async fn test_request_proof_waits_for_confirmation() {
        let url = spawn_node(2, vec!["0xaabb", "0xccdd"]).await;
        let client = client(url.clone(), url);

        let proof = client.request_proof(request()).await.unwrap();
        assert_eq!(proof.as_ref(), &[0xaa, 0xbb, 0xcc, 0xdd]);
    }

    #[tokio::test]
    async fn test_falls_back_to_archive() {
        let archive = spawn_node(0, vec!["0x01"]).await;
        let client = client("ws://127.0.0.1:1".to_string(), archive);

        let proof = client.request_proof(request()).await.unwrap();
        assert_eq!(proof.as_ref(), &[0x01]);
        assert!(!client.primary.is_connected().await);
    }

    #[tokio::test]
    async fn test_unconfirmed_message_gives_up() {
        let url = spawn_node(usize::MAX, vec!["0x01"]).await;
        let client = client(url.clone(), url);

        let err = client.request_proof(request()).await.unwrap_err();
        assert!(matches!(err, MessagingError::ProofUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_empty_signature_set_is_unavailable() {
        let url = spawn_node(0, vec![]).await;
        let client = client(url.clone(), url);

        let err = client.request_proof(request()).await.unwrap_err();
        assert!(matches!(err, MessagingError::ProofUnavailable { .. }));
    }
}
