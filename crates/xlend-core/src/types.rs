//! Core type definitions for XLend

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native EVM chain id (e.g. 11155111 for Sepolia)
pub type ChainId = u64;

/// Equito chain selector, distinct from the native chain id
pub type ChainSelector = u64;

/// Transaction hash
pub type TxHash = alloy_primitives::B256;

/// Token supported by the lending contract on a chain.
///
/// Immutable once fetched; re-fetched whenever the active chain changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub address: Address,
}

impl Token {
    /// Short form used in selectors, e.g. `0xEeee...EEeE`
    pub fn short_address(&self) -> String {
        let full = self.address.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// Native currency of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Chain definition: identity, RPC base and native currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainDefinition {
    pub id: ChainId,
    pub name: &'static str,
    /// Base RPC URL; the wallet client id is appended as a path segment
    pub rpc: &'static str,
    pub native_currency: NativeCurrency,
}

/// Statically configured chain entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub chain_selector: ChainSelector,
    /// CoinMarketCap image id
    pub img: u32,
    pub definition: ChainDefinition,
    /// Lending contract address
    pub contract_address: Address,
    /// Equito router address
    pub router_address: Address,
}

impl Chain {
    pub fn id(&self) -> ChainId {
        self.definition.id
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    /// RPC endpoint for this chain authenticated with the given client id
    pub fn rpc_url(&self, client_id: &str) -> String {
        format!("{}/{}", self.definition.rpc.trim_end_matches('/'), client_id)
    }

    pub fn image_url(&self) -> String {
        format!(
            "https://s2.coinmarketcap.com/static/img/coins/64x64/{}.png",
            self.img
        )
    }

    /// Token metadata for the designated native-token address
    pub fn native_token(&self) -> Token {
        let currency = self.definition.native_currency;
        Token {
            name: currency.name.to_string(),
            symbol: currency.symbol.to_string(),
            decimals: currency.decimals,
            address: constants::NATIVE_TOKEN_ADDRESS,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.definition.name, self.definition.id)
    }
}

/// User-facing lending action, one per page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LendingAction {
    Lend,
    Withdraw,
    Borrow,
    Repay,
}

impl LendingAction {
    pub const ALL: [LendingAction; 4] = [Self::Lend, Self::Withdraw, Self::Borrow, Self::Repay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lend => "lend",
            Self::Withdraw => "withdraw",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lend => "Lend",
            Self::Withdraw => "Withdraw",
            Self::Borrow => "Borrow",
            Self::Repay => "Repay",
        }
    }

    /// Whether the action spends the user's tokens and so needs an ERC-20 approval
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::Lend | Self::Repay)
    }

    /// Whether a native-token amount is attached as transaction value.
    ///
    /// Withdraw pays only the router fee.
    pub fn sends_native_amount(&self) -> bool {
        !matches!(self, Self::Withdraw)
    }

    /// Whether the confirmed receipt must carry a cross-chain message
    pub fn requires_relay(&self) -> bool {
        matches!(self, Self::Borrow)
    }
}

impl fmt::Display for LendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constants
pub mod constants {
    use alloy_primitives::{address, Address};

    /// Sentinel address the lending contract uses for the chain's native asset
    pub const NATIVE_TOKEN_ADDRESS: Address =
        address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

    /// Value attached to `deliverAndExecuteMessage` (10^13 wei)
    pub const DELIVERY_FEE_WEI: u64 = 10_000_000_000_000;

    /// Verifier index passed to the destination router
    pub const VERIFIER_INDEX: u64 = 0;
}

/// Check whether an address is the native-token sentinel
pub fn is_native_token(address: &Address) -> bool {
    *address == constants::NATIVE_TOKEN_ADDRESS
}
