//! Lending state types
//!
//! User selection shared by the four action pages, validated action inputs
//! and the report returned by a flow.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xlend_core::{is_native_token, Chain, ChainId, LendingAction, Token, TxHash};

/// Current token/amount selection and approval flag.
///
/// Last write wins. The approval flag only reflects a successful approval
/// made in this session; it is not checked against on-chain allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub token: Option<Token>,
    /// Amount as entered, in whole-token units
    pub amount: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

impl Selection {
    /// Select a token. Changing the token invalidates a previous approval.
    pub fn select_token(&mut self, token: Token) {
        if self.token.as_ref().map(|t| t.address) != Some(token.address) {
            self.approved = false;
        }
        self.token = Some(token);
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        let amount = amount.into();
        self.amount = if amount.trim().is_empty() {
            None
        } else {
            Some(amount.trim().to_string())
        };
    }

    pub fn mark_approved(&mut self) {
        self.approved = true;
    }

    /// Reset after a chain switch: tokens differ per chain
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_native_token(&self) -> bool {
        self.token
            .as_ref()
            .map(|t| is_native_token(&t.address))
            .unwrap_or(false)
    }

    /// Whether a page offers the approve button for this selection
    pub fn shows_approve(&self, action: LendingAction) -> bool {
        action.requires_approval() && self.token.is_some() && !self.has_native_token()
    }
}

/// Validated input for an approval or an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInput {
    pub account: Address,
    pub chain: &'static Chain,
    pub token: Token,
    /// Amount in the token's base units
    pub amount: U256,
}

/// Steps of a flow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    FeeQuoted,
    Submitted,
    Confirmed,
    MessageParsed,
    TimestampFetched,
    ProofReceived,
    ChainSwitched,
    Delivered,
}

/// What a flow did, including partial progress on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowReport {
    pub flow_id: Uuid,
    pub action: LendingAction,
    pub source_chain_id: ChainId,
    pub token: Address,
    pub amount: U256,
    pub fee: Option<U256>,
    pub value: Option<U256>,
    pub tx_hash: Option<TxHash>,
    pub message_hash: Option<B256>,
    pub destination_chain_id: Option<ChainId>,
    pub delivery_tx_hash: Option<TxHash>,
    pub steps: Vec<FlowStep>,
    pub error: Option<String>,
}

impl FlowReport {
    pub fn new(action: LendingAction, input: &ActionInput) -> Self {
        Self {
            flow_id: Uuid::new_v4(),
            action,
            source_chain_id: input.chain.id(),
            token: input.token.address,
            amount: input.amount,
            fee: None,
            value: None,
            tx_hash: None,
            message_hash: None,
            destination_chain_id: None,
            delivery_tx_hash: None,
            steps: Vec::new(),
            error: None,
        }
    }

    pub fn completed(&self, step: FlowStep) -> bool {
        self.steps.contains(&step)
    }

    pub fn is_relayed(&self) -> bool {
        self.completed(FlowStep::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xlend_core::chains::SEPOLIA;

    fn erc20(byte: u8) -> Token {
        Token {
            name: "USD Coin".into(),
            symbol: "USDC".into(),
            decimals: 6,
            address: Address::repeat_byte(byte),
        }
    }

    #[test]
    fn test_token_change_clears_approval() {
        let mut selection = Selection::default();
        selection.select_token(erc20(1));
        selection.mark_approved();

        // Re-selecting the same token keeps it
        selection.select_token(erc20(1));
        assert!(selection.approved);

        selection.select_token(erc20(2));
        assert!(!selection.approved);
    }

    #[test]
    fn test_last_amount_wins() {
        let mut selection = Selection::default();
        selection.set_amount("1");
        selection.set_amount(" 2.5 ");
        assert_eq!(selection.amount.as_deref(), Some("2.5"));
        selection.set_amount("");
        assert_eq!(selection.amount, None);
    }

    #[test]
    fn test_approve_button_visibility() {
        let mut selection = Selection::default();
        assert!(!selection.shows_approve(LendingAction::Lend));

        selection.select_token(erc20(1));
        assert!(selection.shows_approve(LendingAction::Lend));
        assert!(selection.shows_approve(LendingAction::Repay));
        assert!(!selection.shows_approve(LendingAction::Borrow));
        assert!(!selection.shows_approve(LendingAction::Withdraw));

        selection.select_token(SEPOLIA.native_token());
        assert!(!selection.shows_approve(LendingAction::Lend));
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::default();
        selection.select_token(erc20(1));
        selection.set_amount("3");
        selection.mark_approved();
        selection.clear();
        assert_eq!(selection, Selection::default());
    }
}
