//! Port implementations backed by the network clients

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use equito_client::{EquitoClient, ProofRequest};
use evm_client::EvmClient;
use evm_tx::{BlockHeader, CallRequest, TransactionReceipt, TxRequest};
use xlend_core::{Chain, ChainId, ChainSelector, Result, TxHash};

use crate::ports::{ChainAdapter, ProofProvider};

#[async_trait]
impl ChainAdapter for EvmClient {
    async fn account(&self) -> Option<Address> {
        EvmClient::account(self).await
    }

    async fn connect(&self, account: Option<Address>) -> Result<Address> {
        Ok(EvmClient::connect(self, account).await?)
    }

    async fn disconnect(&self) {
        EvmClient::disconnect(self).await
    }

    async fn active_chain(&self) -> Option<&'static Chain> {
        EvmClient::active_chain(self).await
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<&'static Chain> {
        Ok(EvmClient::switch_chain(self, chain_id).await?)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes> {
        Ok(EvmClient::call(self, request).await?)
    }

    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        Ok(EvmClient::send_transaction(self, tx).await?)
    }

    async fn wait_for_receipt(
        &self,
        chain_id: ChainId,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt> {
        Ok(EvmClient::wait_for_receipt(self, chain_id, tx_hash).await?)
    }

    async fn block_by_number(&self, chain_id: ChainId, number: u64) -> Result<BlockHeader> {
        Ok(EvmClient::block_by_number(self, chain_id, number).await?)
    }
}

#[async_trait]
impl ProofProvider for EquitoClient {
    async fn request_proof(
        &self,
        chain_selector: ChainSelector,
        from_timestamp_ms: u64,
        message_hash: B256,
    ) -> Result<Bytes> {
        let request = ProofRequest {
            message_hash,
            chain_selector,
            from_timestamp: from_timestamp_ms,
        };
        Ok(EquitoClient::request_proof(self, request).await?)
    }
}
