//! In-memory port implementations for flow tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use evm_tx::abi::{
    decimalsCall, getFeeCall, getSupportedAssetsCall, nameCall, symbolCall, EquitoMessage,
    MessageSendRequested, PeerAddress,
};
use evm_tx::{BlockHeader, CallRequest, RpcLog, TransactionReceipt, TxRequest};
use xlend_core::chains::SEPOLIA;
use xlend_core::{
    chain_by_id, supported_chains, Chain, ChainId, ChainSelector, Error, MessagingError, Result,
    RpcError, TxHash,
};

use crate::ports::{ChainAdapter, ProofProvider};

pub struct MockChain {
    account: Mutex<Option<Address>>,
    active: Mutex<Option<ChainId>>,
    fee: U256,
    assets: Vec<Address>,
    tokens: HashMap<Address, (String, String, u8)>,
    message: Option<(ChainSelector, Bytes)>,
    revert_source: bool,
    fail_switch: bool,
    disconnect_after_send: bool,
    calls: AtomicUsize,
    sent: Mutex<Vec<TxRequest>>,
    switched: Mutex<Vec<ChainId>>,
}

impl MockChain {
    pub const BLOCK_TIMESTAMP: u64 = 1_700_000_000;

    /// Connected account on Sepolia
    pub fn new() -> Self {
        Self {
            account: Mutex::new(Some(Address::repeat_byte(0xaa))),
            active: Mutex::new(Some(SEPOLIA.id())),
            fee: U256::from(1_000u64),
            assets: Vec::new(),
            tokens: HashMap::new(),
            message: None,
            revert_source: false,
            fail_switch: false,
            disconnect_after_send: false,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            switched: Mutex::new(Vec::new()),
        }
    }

    pub fn without_account(self) -> Self {
        *self.account.lock().unwrap() = None;
        self
    }

    pub fn with_fee(mut self, fee: U256) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_assets(mut self, assets: Vec<Address>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_token(mut self, address: Address, name: &str, symbol: &str, decimals: u8) -> Self {
        self.tokens
            .insert(address, (name.to_string(), symbol.to_string(), decimals));
        self
    }

    /// Lending contract calls emit a message to `destination`
    pub fn with_message(mut self, destination: ChainSelector, data: Bytes) -> Self {
        self.message = Some((destination, data));
        self
    }

    /// Transactions not sent to a router revert
    pub fn reverting_source(mut self) -> Self {
        self.revert_source = true;
        self
    }

    pub fn failing_switch(mut self) -> Self {
        self.fail_switch = true;
        self
    }

    /// The wallet disconnects once the first transaction is sent
    pub fn disconnecting_after_send(mut self) -> Self {
        self.disconnect_after_send = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<TxRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn switched(&self) -> Vec<ChainId> {
        self.switched.lock().unwrap().clone()
    }

    pub fn emitted_message(&self) -> EquitoMessage {
        let destination = self.message.as_ref().map(|(s, _)| *s).unwrap_or_default();
        EquitoMessage {
            blockNumber: U256::from(16u64),
            sourceChainSelector: U256::from(SEPOLIA.chain_selector),
            sender: PeerAddress {
                lower: B256::left_padding_from(SEPOLIA.contract_address.as_slice()),
                upper: B256::ZERO,
            },
            destinationChainSelector: U256::from(destination),
            receiver: PeerAddress {
                lower: B256::repeat_byte(0x22),
                upper: B256::ZERO,
            },
            hashedData: B256::repeat_byte(0x33),
        }
    }

    fn is_router(address: &Address) -> bool {
        supported_chains().iter().any(|c| c.router_address == *address)
    }

    fn is_lending_contract(address: &Address) -> bool {
        supported_chains().iter().any(|c| c.contract_address == *address)
    }

    fn reverted() -> Error {
        RpcError::JsonRpc {
            code: -32000,
            message: "execution reverted".into(),
        }
        .into()
    }
}

#[async_trait]
impl ChainAdapter for MockChain {
    async fn account(&self) -> Option<Address> {
        *self.account.lock().unwrap()
    }

    async fn connect(&self, account: Option<Address>) -> Result<Address> {
        let account = account.unwrap_or(Address::repeat_byte(0xaa));
        *self.account.lock().unwrap() = Some(account);
        Ok(account)
    }

    async fn disconnect(&self) {
        *self.account.lock().unwrap() = None;
    }

    async fn active_chain(&self) -> Option<&'static Chain> {
        self.active.lock().unwrap().and_then(chain_by_id)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<&'static Chain> {
        if self.fail_switch {
            return Err(RpcError::ChainMismatch {
                expected: chain_id,
                actual: 0,
            }
            .into());
        }
        let chain = chain_by_id(chain_id).ok_or(RpcError::UnknownChain { chain_id })?;
        self.switched.lock().unwrap().push(chain_id);
        *self.active.lock().unwrap() = Some(chain_id);
        Ok(chain)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let selector: [u8; 4] = request
            .data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(Self::reverted)?;
        let token = self.tokens.get(&request.to);

        let encoded = match selector {
            getFeeCall::SELECTOR => self.fee.abi_encode(),
            getSupportedAssetsCall::SELECTOR => self.assets.abi_encode(),
            nameCall::SELECTOR => token.ok_or_else(Self::reverted)?.0.abi_encode(),
            symbolCall::SELECTOR => token.ok_or_else(Self::reverted)?.1.abi_encode(),
            decimalsCall::SELECTOR => U256::from(token.ok_or_else(Self::reverted)?.2).abi_encode(),
            _ => return Err(Self::reverted()),
        };
        Ok(encoded.into())
    }

    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        let active = *self.active.lock().unwrap();
        if active != Some(tx.chain_id) {
            return Err(RpcError::ChainMismatch {
                expected: tx.chain_id,
                actual: active.unwrap_or_default(),
            }
            .into());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx.clone());
        if self.disconnect_after_send {
            *self.account.lock().unwrap() = None;
        }
        Ok(B256::with_last_byte(sent.len() as u8))
    }

    async fn wait_for_receipt(
        &self,
        _chain_id: ChainId,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt> {
        let index = tx_hash.0[31] as usize;
        let tx = self
            .sent
            .lock()
            .unwrap()
            .get(index.wrapping_sub(1))
            .cloned()
            .ok_or(RpcError::ReceiptTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: 0,
            })?;

        let is_delivery = Self::is_router(&tx.to);
        let success = is_delivery || !self.revert_source;

        let mut logs = Vec::new();
        if let (false, Some((_, data))) = (is_delivery, &self.message) {
            if Self::is_lending_contract(&tx.to) {
                let log = MessageSendRequested {
                    message: self.emitted_message(),
                    data: data.clone(),
                }
                .encode_log_data();
                logs.push(RpcLog {
                    address: tx.to,
                    topics: log.topics().to_vec(),
                    data: log.data.clone(),
                    log_index: Some(U64::ZERO),
                });
            }
        }

        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_hash: B256::repeat_byte(0x77),
            block_number: U64::from(16u64),
            status: Some(U64::from(success as u64)),
            logs,
        })
    }

    async fn block_by_number(&self, _chain_id: ChainId, number: u64) -> Result<BlockHeader> {
        Ok(BlockHeader {
            number: U64::from(number),
            hash: B256::repeat_byte(0x77),
            timestamp: U64::from(Self::BLOCK_TIMESTAMP),
        })
    }
}

pub struct MockProofs {
    fail: bool,
    requests: Mutex<Vec<(ChainSelector, u64, B256)>>,
}

impl MockProofs {
    pub fn new() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn proof() -> Bytes {
        Bytes::from(vec![0xab; 65])
    }

    pub fn requests(&self) -> Vec<(ChainSelector, u64, B256)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProofProvider for MockProofs {
    async fn request_proof(
        &self,
        chain_selector: ChainSelector,
        from_timestamp_ms: u64,
        message_hash: B256,
    ) -> Result<Bytes> {
        self.requests
            .lock()
            .unwrap()
            .push((chain_selector, from_timestamp_ms, message_hash));
        if self.fail {
            return Err(MessagingError::ProofUnavailable {
                message_hash: message_hash.to_string(),
            }
            .into());
        }
        Ok(Self::proof())
    }
}
