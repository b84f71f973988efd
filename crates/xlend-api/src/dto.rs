//! Data Transfer Objects for API requests and responses

use alloy_primitives::Address;
use lending::{FlowReport, Selection};
use serde::{Deserialize, Serialize};
use xlend_core::{is_native_token, Chain, ChainId, ChainSelector, LendingAction, Token, TxHash};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Partial progress of a flow that failed after submitting a transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowReport>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            flow: None,
        }
    }
}

impl From<&xlend_core::Error> for ApiError {
    fn from(error: &xlend_core::Error) -> Self {
        Self::new(error.error_code(), error.to_string())
    }
}

// =============================================================================
// Chains and wallet
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub id: ChainId,
    pub name: String,
    pub chain_selector: ChainSelector,
    pub image_url: String,
    pub contract_address: Address,
    pub router_address: Address,
    pub native_symbol: String,
    pub active: bool,
}

impl ChainInfo {
    pub fn new(chain: &Chain, active: bool) -> Self {
        Self {
            id: chain.id(),
            name: chain.name().to_string(),
            chain_selector: chain.chain_selector,
            image_url: chain.image_url(),
            contract_address: chain.contract_address,
            router_address: chain.router_address,
            native_symbol: chain.definition.native_currency.symbol.to_string(),
            active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResponse {
    pub connected: bool,
    pub account: Option<Address>,
    pub chain: Option<ChainInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectRequest {
    #[serde(default)]
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchChainRequest {
    pub chain_id: ChainId,
}

// =============================================================================
// Tokens and selection
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub address: Address,
    pub short_address: String,
    pub native: bool,
}

impl From<&Token> for TokenInfo {
    fn from(token: &Token) -> Self {
        Self {
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            address: token.address,
            short_address: token.short_address(),
            native: is_native_token(&token.address),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub chain_id: ChainId,
    pub tokens: Vec<TokenInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTokenRequest {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAmountRequest {
    pub amount: String,
}

// =============================================================================
// Pages
// =============================================================================

/// Everything a page needs to render its card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageModel {
    pub action: LendingAction,
    pub title: String,
    pub chain: Option<ChainInfo>,
    pub account: Option<Address>,
    pub selection: Selection,
    pub show_approve: bool,
    pub approve_loading: bool,
    pub submit_loading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveResponse {
    pub tx_hash: TxHash,
    pub approved: bool,
}
