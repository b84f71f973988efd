//! Contract call and transaction request builders
//!
//! Builders are pure: they produce the `eth_call` / `eth_sendTransaction`
//! payloads and leave submission to the chain client.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use xlend_core::{constants, is_native_token, Chain, ChainId, LendingAction};

use crate::abi::{
    approveCall, borrowCall, decimalsCall, deliverAndExecuteMessageCall, getFeeCall,
    getSupportedAssetsCall, lendCall, nameCall, repayCall, symbolCall, withdrawCall,
};
use crate::message::SentMessage;
use crate::AbiError;

/// Read-only contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub chain_id: ChainId,
    pub to: Address,
    pub data: Bytes,
}

/// Unsigned transaction handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub chain_id: ChainId,
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl TxRequest {
    /// 4-byte selector of the encoded call
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

fn call<C: SolCall>(chain_id: ChainId, to: Address, call: C) -> CallRequest {
    CallRequest {
        chain_id,
        to,
        data: call.abi_encode().into(),
    }
}

/// Decode the return data of a call
pub fn decode_return<C: SolCall>(data: &[u8]) -> Result<C::Return, AbiError> {
    C::abi_decode_returns(data).map_err(|e| AbiError {
        context: C::SIGNATURE,
        message: e.to_string(),
    })
}

// =============================================================================
// Reads
// =============================================================================

/// Router fee quote for the chain's lending contract
pub fn fee_quote_call(chain: &Chain) -> CallRequest {
    call(
        chain.id(),
        chain.router_address,
        getFeeCall {
            sender: chain.contract_address,
        },
    )
}

/// Assets supported by the lending contract for the chain's selector
pub fn supported_assets_call(chain: &Chain) -> CallRequest {
    call(
        chain.id(),
        chain.contract_address,
        getSupportedAssetsCall {
            chainSelector: U256::from(chain.chain_selector),
        },
    )
}

pub fn token_name_call(chain_id: ChainId, token: Address) -> CallRequest {
    call(chain_id, token, nameCall {})
}

pub fn token_symbol_call(chain_id: ChainId, token: Address) -> CallRequest {
    call(chain_id, token, symbolCall {})
}

pub fn token_decimals_call(chain_id: ChainId, token: Address) -> CallRequest {
    call(chain_id, token, decimalsCall {})
}

// =============================================================================
// Writes
// =============================================================================

/// Transaction value for a lending action: router fee, plus the amount
/// itself when the token is the native asset and the action pays it in.
pub fn action_value(action: LendingAction, token: &Address, amount: U256, fee: U256) -> U256 {
    if action.sends_native_amount() && is_native_token(token) {
        fee.saturating_add(amount)
    } else {
        fee
    }
}

/// Lending contract call for an action
pub fn lending_action_tx(
    chain: &Chain,
    from: Address,
    action: LendingAction,
    token: Address,
    amount: U256,
    fee: U256,
) -> TxRequest {
    let data: Vec<u8> = match action {
        LendingAction::Lend => lendCall { token, amount }.abi_encode(),
        LendingAction::Withdraw => withdrawCall { token, amount }.abi_encode(),
        LendingAction::Borrow => borrowCall { token, amount }.abi_encode(),
        LendingAction::Repay => repayCall { token, amount }.abi_encode(),
    };
    TxRequest {
        chain_id: chain.id(),
        from,
        to: chain.contract_address,
        data: data.into(),
        value: action_value(action, &token, amount, fee),
    }
}

/// ERC-20 approval of the lending contract
pub fn approve_tx(chain: &Chain, from: Address, token: Address, amount: U256) -> TxRequest {
    TxRequest {
        chain_id: chain.id(),
        from,
        to: token,
        data: approveCall {
            spender: chain.contract_address,
            amount,
        }
        .abi_encode()
        .into(),
        value: U256::ZERO,
    }
}

/// Delivery of a proven message on the destination router
pub fn deliver_tx(
    destination: &Chain,
    from: Address,
    sent: &SentMessage,
    proof: Bytes,
) -> TxRequest {
    TxRequest {
        chain_id: destination.id(),
        from,
        to: destination.router_address,
        data: deliverAndExecuteMessageCall {
            message: sent.message.clone(),
            messageData: sent.data.clone(),
            verifierIndex: U256::from(constants::VERIFIER_INDEX),
            proof,
        }
        .abi_encode()
        .into(),
        value: U256::from(constants::DELIVERY_FEE_WEI),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tests::sample_message;
    use alloy_sol_types::SolValue;
    use xlend_core::chains::{ARBITRUM_SEPOLIA, SEPOLIA};
    use xlend_core::constants::NATIVE_TOKEN_ADDRESS;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    fn user() -> Address {
        Address::repeat_byte(0xaa)
    }

    #[test]
    fn test_native_borrow_value_includes_amount() {
        let fee = U256::from(5_000u64);
        let amount = U256::from(ONE_ETHER);
        let tx = lending_action_tx(
            &SEPOLIA,
            user(),
            LendingAction::Borrow,
            NATIVE_TOKEN_ADDRESS,
            amount,
            fee,
        );
        assert_eq!(tx.value, fee + amount);
        assert_eq!(tx.to, SEPOLIA.contract_address);
        assert_eq!(tx.chain_id, SEPOLIA.id());

        let decoded = borrowCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.token, NATIVE_TOKEN_ADDRESS);
        assert_eq!(decoded.amount, amount);
    }

    #[test]
    fn test_erc20_borrow_value_is_fee_only() {
        let fee = U256::from(5_000u64);
        let token = Address::repeat_byte(0x01);
        let tx = lending_action_tx(
            &SEPOLIA,
            user(),
            LendingAction::Borrow,
            token,
            U256::from(1_000_000u64),
            fee,
        );
        assert_eq!(tx.value, fee);
    }

    #[test]
    fn test_withdraw_never_attaches_amount() {
        let fee = U256::from(7u64);
        let tx = lending_action_tx(
            &SEPOLIA,
            user(),
            LendingAction::Withdraw,
            NATIVE_TOKEN_ADDRESS,
            U256::from(ONE_ETHER),
            fee,
        );
        assert_eq!(tx.value, fee);
        assert_eq!(tx.selector(), Some(withdrawCall::SELECTOR));
    }

    #[test]
    fn test_approve_targets_token_with_lending_spender() {
        let token = Address::repeat_byte(0x01);
        let tx = approve_tx(&ARBITRUM_SEPOLIA, user(), token, U256::from(10u64));
        assert_eq!(tx.to, token);
        assert_eq!(tx.value, U256::ZERO);
        let decoded = approveCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.spender, ARBITRUM_SEPOLIA.contract_address);
        assert_eq!(decoded.amount, U256::from(10u64));
    }

    #[test]
    fn test_deliver_carries_message_payload_and_proof() {
        let sent = SentMessage {
            message: sample_message(1004),
            data: Bytes::from(vec![9u8, 8, 7]),
            emitter: SEPOLIA.contract_address,
        };
        let proof = Bytes::from(vec![0xab; 65]);
        let tx = deliver_tx(&ARBITRUM_SEPOLIA, user(), &sent, proof.clone());

        assert_eq!(tx.to, ARBITRUM_SEPOLIA.router_address);
        assert_eq!(tx.value, U256::from(10_000_000_000_000u64));

        let decoded = deliverAndExecuteMessageCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.message, sent.message);
        assert_eq!(decoded.messageData, sent.data);
        assert_eq!(decoded.verifierIndex, U256::ZERO);
        assert_eq!(decoded.proof, proof);
    }

    #[test]
    fn test_fee_quote_call_targets_router() {
        let req = fee_quote_call(&SEPOLIA);
        assert_eq!(req.to, SEPOLIA.router_address);
        let decoded = getFeeCall::abi_decode(&req.data).unwrap();
        assert_eq!(decoded.sender, SEPOLIA.contract_address);
    }

    #[test]
    fn test_decode_returns() {
        let fee = decode_return::<getFeeCall>(&U256::from(42u64).abi_encode()).unwrap();
        assert_eq!(fee, U256::from(42u64));

        let assets = vec![NATIVE_TOKEN_ADDRESS, Address::repeat_byte(0x01)];
        let decoded = decode_return::<getSupportedAssetsCall>(&assets.abi_encode()).unwrap();
        assert_eq!(decoded, assets);

        let name = decode_return::<nameCall>(&"USD Coin".to_string().abi_encode()).unwrap();
        assert_eq!(name, "USD Coin");

        assert!(decode_return::<getFeeCall>(&[0u8; 3]).is_err());
    }
}
