//! Outbound ports
//!
//! The flows talk to the wallet/chain and to the messaging network only
//! through these traits.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use evm_tx::{BlockHeader, CallRequest, TransactionReceipt, TxRequest};
use xlend_core::{Chain, ChainId, ChainSelector, Result, TxHash};

/// Wallet connection and chain access
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Connected account, if any
    async fn account(&self) -> Option<Address>;

    /// Connect an account, the endpoint's own when none is given
    async fn connect(&self, account: Option<Address>) -> Result<Address>;

    async fn disconnect(&self);

    /// Chain the wallet is currently on
    async fn active_chain(&self) -> Option<&'static Chain>;

    async fn switch_chain(&self, chain_id: ChainId) -> Result<&'static Chain>;

    /// Read-only contract call
    async fn call(&self, request: &CallRequest) -> Result<Bytes>;

    /// Submit a transaction from the connected account
    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash>;

    async fn wait_for_receipt(&self, chain_id: ChainId, tx_hash: TxHash)
        -> Result<TransactionReceipt>;

    async fn block_by_number(&self, chain_id: ChainId, number: u64) -> Result<BlockHeader>;
}

/// Source of delivery proofs for cross-chain messages
#[async_trait]
pub trait ProofProvider: Send + Sync {
    /// Proof that `message_hash` was emitted, looking from `from_timestamp_ms` on
    async fn request_proof(
        &self,
        chain_selector: ChainSelector,
        from_timestamp_ms: u64,
        message_hash: B256,
    ) -> Result<Bytes>;
}
