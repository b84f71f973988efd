//! JSON-RPC receipt, log and block shapes

use alloy_primitives::{Address, Bytes, LogData, B256, U64};
use serde::{Deserialize, Serialize};

/// Event log as returned by `eth_getTransactionReceipt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub log_index: Option<U64>,
}

impl RpcLog {
    pub fn log_data(&self) -> LogData {
        LogData::new_unchecked(self.topics.clone(), self.data.clone())
    }
}

/// Transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_hash: B256,
    pub block_number: U64,
    /// `0x1` on success, `0x0` on revert. Pre-Byzantium receipts omit it.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == Some(U64::from(1u64))
    }

    pub fn block_number(&self) -> u64 {
        self.block_number.to::<u64>()
    }
}

/// Subset of `eth_getBlockByNumber` the flows need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: U64,
    pub hash: B256,
    /// Seconds since the Unix epoch
    pub timestamp: U64,
}

impl BlockHeader {
    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp.to::<u64>()
    }

    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_secs().saturating_mul(1000)
    }
}
