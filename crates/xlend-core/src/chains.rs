//! Statically configured chains
//!
//! Two testnets with the XLend lending contract and the Equito router deployed.

use alloy_primitives::address;

use crate::{Chain, ChainDefinition, ChainId, ChainSelector, NativeCurrency};

pub const SEPOLIA: Chain = Chain {
    chain_selector: 1001,
    img: 1027,
    definition: ChainDefinition {
        id: 11_155_111,
        name: "Sepolia",
        rpc: "https://11155111.rpc.thirdweb.com",
        native_currency: NativeCurrency {
            name: "Sepolia Ether",
            symbol: "ETH",
            decimals: 18,
        },
    },
    contract_address: address!("0xbc9E3227d66aBD34450d452598Bac45ec723d175"),
    router_address: address!("0x35D899517F07b1026e36F6418c53BC1305dCA5a5"),
};

pub const ARBITRUM_SEPOLIA: Chain = Chain {
    chain_selector: 1004,
    img: 11841,
    definition: ChainDefinition {
        id: 421_614,
        name: "Arbitrum Sepolia",
        rpc: "https://421614.rpc.thirdweb.com",
        native_currency: NativeCurrency {
            name: "Arbitrum Sepolia Ether",
            symbol: "ETH",
            decimals: 18,
        },
    },
    contract_address: address!("0x05d3076a59020B0E2896CC351db3Ab04c67F7aD8"),
    router_address: address!("0x5C5386A7D14d9D6c24913386db74c20e36Bc436c"),
};

static SUPPORTED_CHAINS: [Chain; 2] = [SEPOLIA, ARBITRUM_SEPOLIA];

/// All configured chains, in display order
pub fn supported_chains() -> &'static [Chain] {
    &SUPPORTED_CHAINS
}

/// Look up a chain by its native chain id
pub fn chain_by_id(chain_id: ChainId) -> Option<&'static Chain> {
    SUPPORTED_CHAINS.iter().find(|c| c.id() == chain_id)
}

/// Look up a chain by its Equito chain selector
pub fn chain_by_selector(selector: ChainSelector) -> Option<&'static Chain> {
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.chain_selector == selector)
}
