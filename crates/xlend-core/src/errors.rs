//! Error types for XLend

use thiserror::Error;

use crate::{ChainId, ChainSelector};

/// Core errors that can occur in XLend
#[derive(Debug, Error)]
pub enum Error {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("{0}")]
    Flow(#[from] FlowError),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Chain JSON-RPC errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("RPC endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("RPC returned error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("RPC request failed: {message}")]
    ApiError { message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No RPC endpoint configured for chain {chain_id}")]
    UnknownChain { chain_id: ChainId },

    #[error("Endpoint reports chain {actual}, expected {expected}")]
    ChainMismatch { expected: ChainId, actual: ChainId },

    #[error("Endpoint exposes no accounts")]
    NoAccounts,

    #[error("Block {number} not found")]
    BlockNotFound { number: u64 },

    #[error("Transaction {tx_hash} not confirmed after {waited_secs}s")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },
}

/// Equito messaging client errors
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Messaging endpoint unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Messaging connection closed")]
    ConnectionClosed,

    #[error("Messaging endpoint returned error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Failed to parse messaging response: {0}")]
    ParseError(String),

    #[error("Messaging request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("No proof available for message {message_hash}")]
    ProofUnavailable { message_hash: String },
}

/// Flow validation and on-chain outcome errors.
///
/// Display strings for the validation variants are the messages users see.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("No account")]
    NoAccount,

    #[error("No token selected")]
    NoTokenSelected,

    #[error("No amount selected")]
    NoAmountSelected,

    #[error("No active chain")]
    NoActiveChain,

    #[error("No chain found, please select a chain")]
    NoChainFound,

    #[error("No Account found, please connect your wallet")]
    NoWalletAccount,

    #[error("Transaction failed")]
    TransactionFailed { tx_hash: Option<String> },

    #[error("Failed to approve")]
    ApproveFailed,

    #[error("Not approved")]
    NotApproved,

    #[error("Approval is not required for the native token")]
    ApprovalNotRequired,

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("No MessageSendRequested event in transaction {tx_hash}")]
    MissingMessageEvent { tx_hash: String },

    #[error("No chain configured for selector {selector}")]
    UnknownDestination { selector: ChainSelector },

    #[error("Token {address} is not supported on the active chain")]
    UnknownToken { address: String },

    #[error("{action} is already in progress")]
    InProgress { action: String },
}

/// Result type alias for XLend operations
pub type Result<T> = std::result::Result<T, Error>;

impl FlowError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoAccount => "no_account",
            Self::NoTokenSelected => "no_token_selected",
            Self::NoAmountSelected => "no_amount_selected",
            Self::NoActiveChain => "no_active_chain",
            Self::NoChainFound => "no_chain_found",
            Self::NoWalletAccount => "no_wallet_account",
            Self::TransactionFailed { .. } => "transaction_failed",
            Self::ApproveFailed => "approve_failed",
            Self::NotApproved => "not_approved",
            Self::ApprovalNotRequired => "approval_not_required",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::MissingMessageEvent { .. } => "missing_message_event",
            Self::UnknownDestination { .. } => "unknown_destination",
            Self::UnknownToken { .. } => "unknown_token",
            Self::InProgress { .. } => "in_progress",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoTokenSelected | Self::NoAmountSelected | Self::InvalidAmount { .. } => 400,
            Self::NoAccount | Self::NoWalletAccount => 422,
            Self::NoActiveChain | Self::NoChainFound => 422,
            Self::NotApproved | Self::ApprovalNotRequired => 422,
            Self::UnknownDestination { .. }
            | Self::UnknownToken { .. } => 422,
            Self::InProgress { .. } => 409,
            Self::TransactionFailed { .. }
            | Self::ApproveFailed
            | Self::MissingMessageEvent { .. } => 502,
        }
    }
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rpc(_) => "rpc_error",
            Self::Messaging(_) => "messaging_error",
            Self::Flow(e) => e.error_code(),
            Self::Abi(_) => "abi_error",
            Self::Config(_) => "config_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rpc(RpcError::UnknownChain { .. }) => 422,
            Self::Rpc(_) | Self::Messaging(_) | Self::Abi(_) => 502,
            Self::Flow(e) => e.status_code(),
            Self::Config(_) => 500,
        }
    }
}
