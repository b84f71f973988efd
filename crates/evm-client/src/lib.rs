//! evm-client: JSON-RPC client for the XLend chains
//!
//! Plays the role of the wallet connection: it holds the connected account
//! and the active chain, performs read calls, submits transactions through
//! node-managed accounts (`eth_sendTransaction`) and waits for receipts.

pub mod rpc;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, Bytes, U256, U64};
use evm_tx::{BlockHeader, CallRequest, TransactionReceipt, TxRequest};
use serde::Serialize;
use tokio::sync::RwLock;
use xlend_core::{chain_by_id, supported_chains, Chain, ChainId, ReceiptConfig, RpcConfig, RpcError, TxHash};

pub use rpc::{HttpTransport, RPC_REQUEST_TIMEOUT};

/// Result type for chain client operations
pub type Result<T> = std::result::Result<T, RpcError>;

#[derive(Debug, Default)]
struct WalletState {
    account: Option<Address>,
    active_chain: Option<ChainId>,
}

#[derive(Serialize)]
struct CallParams<'a> {
    to: &'a Address,
    data: &'a Bytes,
}

#[derive(Serialize)]
struct SendParams<'a> {
    from: &'a Address,
    to: &'a Address,
    data: &'a Bytes,
    value: &'a U256,
}

/// Multi-chain EVM client with wallet-like session state
#[derive(Clone)]
pub struct EvmClient {
    transports: Arc<BTreeMap<ChainId, HttpTransport>>,
    wallet: Arc<RwLock<WalletState>>,
    default_account: Option<Address>,
    receipt: ReceiptConfig,
}

impl EvmClient {
    /// Client for every supported chain, with the first one active
    pub fn new(config: &RpcConfig, receipt: ReceiptConfig) -> Self {
        let endpoints = supported_chains()
            .iter()
            .map(|chain| (chain.id(), config.rpc_url(chain)))
            .collect();
        Self::with_endpoints(endpoints, config.default_account, receipt)
    }

    pub fn with_endpoints(
        endpoints: BTreeMap<ChainId, String>,
        default_account: Option<Address>,
        receipt: ReceiptConfig,
    ) -> Self {
        let http = reqwest::Client::new();
        let transports = endpoints
            .into_iter()
            .map(|(id, url)| (id, HttpTransport::new(http.clone(), url)))
            .collect();

        Self {
            transports: Arc::new(transports),
            wallet: Arc::new(RwLock::new(WalletState {
                account: None,
                active_chain: supported_chains().first().map(|c| c.id()),
            })),
            default_account,
            receipt,
        }
    }

    fn transport(&self, chain_id: ChainId) -> Result<&HttpTransport> {
        self.transports
            .get(&chain_id)
            .ok_or(RpcError::UnknownChain { chain_id })
    }

    // =========================================================================
    // Wallet session
    // =========================================================================

    /// Connected account, if any
    pub async fn account(&self) -> Option<Address> {
        self.wallet.read().await.account
    }

    /// Chain the wallet is currently on
    pub async fn active_chain(&self) -> Option<&'static Chain> {
        self.wallet
            .read()
            .await
            .active_chain
            .and_then(chain_by_id)
    }

    /// Connect an account on the active chain.
    ///
    /// An explicit account wins, then the configured default, then the first
    /// account the endpoint manages.
    pub async fn connect(&self, requested: Option<Address>) -> Result<Address> {
        let account = match requested.or(self.default_account) {
            Some(account) => account,
            None => {
                let chain_id = self
                    .wallet
                    .read()
                    .await
                    .active_chain
                    .ok_or(RpcError::NoAccounts)?;
                let accounts: Vec<Address> = self
                    .transport(chain_id)?
                    .call("eth_accounts", Vec::<()>::new())
                    .await?;
                accounts.into_iter().next().ok_or(RpcError::NoAccounts)?
            }
        };

        self.wallet.write().await.account = Some(account);
        tracing::info!(%account, "Wallet connected");
        Ok(account)
    }

    pub async fn disconnect(&self) {
        let previous = self.wallet.write().await.account.take();
        if let Some(account) = previous {
            tracing::info!(%account, "Wallet disconnected");
        }
    }

    /// Switch the active chain after confirming the endpoint serves it
    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<&'static Chain> {
        let chain = chain_by_id(chain_id).ok_or(RpcError::UnknownChain { chain_id })?;

        let actual = self.chain_id(chain_id).await?;
        if actual != chain_id {
            return Err(RpcError::ChainMismatch {
                expected: chain_id,
                actual,
            });
        }

        let mut wallet = self.wallet.write().await;
        if wallet.active_chain != Some(chain_id) {
            tracing::info!(chain = %chain, "Switched active chain");
        }
        wallet.active_chain = Some(chain_id);
        Ok(chain)
    }

    // =========================================================================
    // Chain access
    // =========================================================================

    /// Chain id reported by the endpoint configured for `chain_id`
    pub async fn chain_id(&self, chain_id: ChainId) -> Result<ChainId> {
        let id: U64 = self
            .transport(chain_id)?
            .call("eth_chainId", Vec::<()>::new())
            .await?;
        Ok(id.to::<u64>())
    }

    /// Execute a read-only call at the latest block
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes> {
        let params = CallParams {
            to: &request.to,
            data: &request.data,
        };
        self.transport(request.chain_id)?
            .call("eth_call", (params, "latest"))
            .await
    }

    /// Submit a transaction from the connected account on the active chain
    pub async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        let active = self.wallet.read().await.active_chain;
        if active != Some(tx.chain_id) {
            return Err(RpcError::ChainMismatch {
                expected: tx.chain_id,
                actual: active.unwrap_or_default(),
            });
        }

        let params = SendParams {
            from: &tx.from,
            to: &tx.to,
            data: &tx.data,
            value: &tx.value,
        };
        let hash: TxHash = self
            .transport(tx.chain_id)?
            .call("eth_sendTransaction", [params])
            .await?;

        tracing::debug!(chain_id = tx.chain_id, tx_hash = %hash, to = %tx.to, "Transaction submitted");
        Ok(hash)
    }

    /// Poll for a receipt until it appears or the configured ceiling elapses
    pub async fn wait_for_receipt(
        &self,
        chain_id: ChainId,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt> {
        let transport = self.transport(chain_id)?;
        let poll = Duration::from_millis(self.receipt.poll_ms.max(1));
        let ceiling = Duration::from_secs(self.receipt.timeout_secs);
        let started = Instant::now();

        loop {
            let receipt: Option<TransactionReceipt> = transport
                .call_optional("eth_getTransactionReceipt", [tx_hash])
                .await?;
            if let Some(receipt) = receipt {
                tracing::debug!(
                    chain_id,
                    tx_hash = %tx_hash,
                    block = receipt.block_number(),
                    success = receipt.is_success(),
                    "Receipt received"
                );
                return Ok(receipt);
            }

            if started.elapsed() >= ceiling {
                return Err(RpcError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Block header by number
    pub async fn block_by_number(&self, chain_id: ChainId, number: u64) -> Result<BlockHeader> {
        let block: Option<BlockHeader> = self
            .transport(chain_id)?
            .call_optional(
                "eth_getBlockByNumber",
                (rpc::to_quantity(number), false),
            )
            .await?;
        block.ok_or(RpcError::BlockNotFound { number })
    }
}
