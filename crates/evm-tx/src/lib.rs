//! evm-tx: Transaction building utilities for the XLend contracts
//!
//! Provides the ABI surface of the lending contract, the Equito router and
//! ERC-20 tokens, unsigned transaction requests, JSON-RPC receipt shapes and
//! decimal amount scaling.

pub mod abi;
pub mod message;
pub mod receipt;
pub mod request;
pub mod units;

pub use abi::{EquitoMessage, PeerAddress};
pub use message::{find_sent_message, message_hash, sent_messages, SentMessage};
pub use receipt::{BlockHeader, RpcLog, TransactionReceipt};
pub use request::*;
pub use units::{scale_amount, UnitsError};

/// ABI encode/decode failure
#[derive(Debug, thiserror::Error)]
#[error("ABI decode failed for {context}: {message}")]
pub struct AbiError {
    pub context: &'static str,
    pub message: String,
}

impl From<AbiError> for xlend_core::Error {
    fn from(e: AbiError) -> Self {
        xlend_core::Error::Abi(e.to_string())
    }
}
