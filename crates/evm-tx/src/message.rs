//! Equito message extraction and hashing

use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_sol_types::{SolEvent, SolValue};

use crate::abi::{EquitoMessage, MessageSendRequested};
use crate::receipt::{RpcLog, TransactionReceipt};

/// A `MessageSendRequested` occurrence decoded from a receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message: EquitoMessage,
    /// Original payload bytes, passed unchanged to the destination router
    pub data: Bytes,
    /// Contract that emitted the event
    pub emitter: Address,
}

impl EquitoMessage {
    pub fn destination_selector(&self) -> Option<u64> {
        u64::try_from(self.destinationChainSelector).ok()
    }

    pub fn hash(&self) -> B256 {
        message_hash(self)
    }
}

/// Message hash as computed by the Equito SDK: keccak256 of the ABI-encoded struct
pub fn message_hash(message: &EquitoMessage) -> B256 {
    keccak256(message.abi_encode())
}

/// Decode every `MessageSendRequested` event in log order.
///
/// Logs with a matching topic but malformed data are skipped.
pub fn sent_messages(logs: &[RpcLog]) -> Vec<SentMessage> {
    logs.iter()
        .filter(|log| log.topics.first() == Some(&MessageSendRequested::SIGNATURE_HASH))
        .filter_map(|log| {
            MessageSendRequested::decode_log_data(&log.log_data())
                .ok()
                .map(|event| SentMessage {
                    message: event.message,
                    data: event.data,
                    emitter: log.address,
                })
        })
        .collect()
}

/// First `MessageSendRequested` event of a receipt
pub fn find_sent_message(receipt: &TransactionReceipt) -> Option<SentMessage> {
    sent_messages(&receipt.logs).into_iter().next()
}
