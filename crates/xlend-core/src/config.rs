//! Configuration types for XLend

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{Chain, ChainId, Error, Result};

/// Wallet SDK client id, used to authenticate the default RPC endpoints
pub const ENV_CLIENT_ID: &str = "THIRDWEB_CLIENT_ID";
/// Primary Equito WebSocket endpoint
pub const ENV_WS_ENDPOINT: &str = "TESTNET_WS_ENDPOINT";
/// Archive Equito WebSocket endpoint
pub const ENV_ARCHIVE_WS_ENDPOINT: &str = "TESTNET_ARCHIVE_WS_ENDPOINT";

pub const ENV_API_PORT: &str = "XLEND_API_PORT";
pub const ENV_ACCOUNT: &str = "XLEND_ACCOUNT";
pub const ENV_RPC_URL_PREFIX: &str = "XLEND_RPC_URL_";
pub const ENV_RECEIPT_POLL_MS: &str = "XLEND_RECEIPT_POLL_MS";
pub const ENV_RECEIPT_TIMEOUT_SECS: &str = "XLEND_RECEIPT_TIMEOUT_SECS";

/// Chain RPC settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Wallet SDK client id appended to the default RPC URLs
    pub client_id: String,

    /// Per-chain RPC URL overrides
    #[serde(default)]
    pub overrides: BTreeMap<ChainId, String>,

    /// Account to connect at startup (otherwise the first endpoint account)
    #[serde(default)]
    pub default_account: Option<Address>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            overrides: BTreeMap::new(),
            default_account: None,
        }
    }
}

impl RpcConfig {
    /// RPC URL for a chain, honouring overrides
    pub fn rpc_url(&self, chain: &Chain) -> String {
        self.overrides
            .get(&chain.id())
            .cloned()
            .unwrap_or_else(|| chain.rpc_url(&self.client_id))
    }
}

/// Equito messaging client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub ws_endpoint: String,
    pub archive_ws_endpoint: String,

    /// Delay between proof availability checks
    #[serde(default = "default_proof_poll_ms")]
    pub proof_poll_ms: u64,

    /// Number of availability checks before giving up
    #[serde(default = "default_proof_max_polls")]
    pub proof_max_polls: u32,
}

fn default_proof_poll_ms() -> u64 {
    2_000
}

fn default_proof_max_polls() -> u32 {
    150
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            ws_endpoint: String::new(),
            archive_ws_endpoint: String::new(),
            proof_poll_ms: default_proof_poll_ms(),
            proof_max_polls: default_proof_max_polls(),
        }
    }
}

/// Receipt polling settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReceiptConfig {
    pub poll_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            poll_ms: 2_000,
            timeout_secs: 600,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub rpc: RpcConfig,

    pub messaging: MessagingConfig,

    #[serde(default)]
    pub receipt: ReceiptConfig,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    19054
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            messaging: MessagingConfig::default(),
            receipt: ReceiptConfig::default(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Load from process environment. Missing required variables are fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id =
            get(ENV_CLIENT_ID).ok_or_else(|| Error::Config("No client ID provided".to_string()))?;

        let (ws_endpoint, archive_ws_endpoint) =
            match (get(ENV_WS_ENDPOINT), get(ENV_ARCHIVE_WS_ENDPOINT)) {
                (Some(ws), Some(archive)) => (ws, archive),
                _ => {
                    return Err(Error::Config(format!(
                        "Missing environment variables {} and {} for Equito client",
                        ENV_WS_ENDPOINT, ENV_ARCHIVE_WS_ENDPOINT
                    )))
                }
            };

        let mut config = Self {
            rpc: RpcConfig {
                client_id,
                ..RpcConfig::default()
            },
            messaging: MessagingConfig {
                ws_endpoint,
                archive_ws_endpoint,
                ..MessagingConfig::default()
            },
            ..Self::default()
        };

        if let Some(port) = get(ENV_API_PORT) {
            config.api_port = parse_var(ENV_API_PORT, &port)?;
        }
        if let Some(account) = get(ENV_ACCOUNT) {
            config.rpc.default_account = Some(parse_var(ENV_ACCOUNT, &account)?);
        }
        if let Some(poll) = get(ENV_RECEIPT_POLL_MS) {
            config.receipt.poll_ms = parse_var(ENV_RECEIPT_POLL_MS, &poll)?;
        }
        if let Some(timeout) = get(ENV_RECEIPT_TIMEOUT_SECS) {
            config.receipt.timeout_secs = parse_var(ENV_RECEIPT_TIMEOUT_SECS, &timeout)?;
        }
        for chain in crate::supported_chains() {
            let key = format!("{}{}", ENV_RPC_URL_PREFIX, chain.id());
            if let Some(url) = get(&key) {
                config.rpc.overrides.insert(chain.id(), url);
            }
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{ARBITRUM_SEPOLIA, SEPOLIA};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_CLIENT_ID, "client"),
            (ENV_WS_ENDPOINT, "wss://equito.example/ws"),
            (ENV_ARCHIVE_WS_ENDPOINT, "wss://equito.example/archive"),
        ]
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_port, 19054);
        assert_eq!(config.receipt.poll_ms, 2_000);
    }

    #[test]
    fn test_from_lookup_required_vars() {
        let config = AppConfig::from_lookup(lookup(&required())).unwrap();
        assert_eq!(config.rpc.client_id, "client");
        assert_eq!(config.messaging.archive_ws_endpoint, "wss://equito.example/archive");
        assert_eq!(
            config.rpc.rpc_url(&SEPOLIA),
            "https://11155111.rpc.thirdweb.com/client"
        );
    }

    #[test]
    fn test_missing_client_id_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&required()[1..])).unwrap_err();
        assert!(err.to_string().contains("No client ID provided"));
    }

    #[test]
    fn test_missing_ws_endpoint_is_fatal() {
        let vars = vec![
            (ENV_CLIENT_ID, "client"),
            (ENV_ARCHIVE_WS_ENDPOINT, "wss://equito.example/archive"),
        ];
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains(ENV_WS_ENDPOINT));
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = required();
        vars.push(("XLEND_RPC_URL_421614", "http://127.0.0.1:8545"));
        vars.push((ENV_API_PORT, "8080"));
        vars.push((ENV_ACCOUNT, "0x00000000000000000000000000000000000000aa"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(
            config.rpc.rpc_url(&ARBITRUM_SEPOLIA),
            "http://127.0.0.1:8545"
        );
        assert!(config.rpc.default_account.is_some());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = required();
        vars.push((ENV_API_PORT, "not-a-port"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::from_lookup(lookup(&required())).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.messaging.ws_endpoint, config.messaging.ws_endpoint);
    }
}
