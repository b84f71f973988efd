//! JSON-RPC 2.0 transport over HTTP

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use xlend_core::RpcError;

/// Timeout for a single RPC request
pub const RPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl<R> JsonRpcResponse<R> {
    /// Result of the call. A missing result is returned as `None`
    /// (e.g. a receipt that is not available yet).
    pub(crate) fn into_result(self) -> Result<Option<R>, RpcError> {
        if let Some(err) = self.error {
            return Err(RpcError::JsonRpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(self.result)
    }
}

/// HTTP JSON-RPC transport for one endpoint
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self {
            http,
            url,
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a method whose result may legitimately be `null`
    pub async fn call_optional<P, R>(&self, method: &str, params: P) -> Result<Option<R>, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        tracing::trace!(url = %self.url, method, id, "rpc request");

        let send = async {
            let response = self
                .http
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        RpcError::Unreachable {
                            url: self.url.clone(),
                        }
                    } else {
                        RpcError::ApiError {
                            message: e.to_string(),
                        }
                    }
                })?;
            response
                .json::<JsonRpcResponse<R>>()
                .await
                .map_err(|e| RpcError::ParseError(format!("{}: {}", method, e)))
        };

        timed_request(send).await?.into_result()
    }

    /// Call a method that must return a result
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| RpcError::ParseError(format!("{}: response missing result", method)))
    }
}

/// Bound a request by `RPC_REQUEST_TIMEOUT`
pub(crate) async fn timed_request<T>(
    fut: impl std::future::Future<Output = Result<T, RpcError>>,
) -> Result<T, RpcError> {
    tokio::time::timeout(RPC_REQUEST_TIMEOUT, fut)
        .await
        .map_err(|_| RpcError::ApiError {
            message: format!(
                "RPC request timed out after {}s",
                RPC_REQUEST_TIMEOUT.as_secs()
            ),
        })?
}

/// Hex quantity as used in JSON-RPC params
pub fn to_quantity(value: u64) -> String {
    format!("{:#x}", value)
}
