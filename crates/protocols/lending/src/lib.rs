//! XLend Lending Flows
//!
//! Cross-chain lending on top of the Equito messaging network.
//!
//! # Flow Overview
//!
//! The four actions (lend, withdraw, borrow, repay) call the lending contract
//! on the active chain and pay the Equito router fee. Lend and repay spend an
//! ERC-20 token and need an approval first. A borrow emits a cross-chain
//! message that is proven and delivered on the destination chain:
//!
//! ```text
//! getFee -> borrow -> receipt -> MessageSendRequested -> block timestamp
//!        -> proof -> switch chain -> deliverAndExecuteMessage -> receipt
//! ```
//!
//! # Architecture
//!
//! Flows depend on the [`ChainAdapter`] and [`ProofProvider`] ports; the
//! network clients implement them in [`adapters`].

pub mod adapters;
pub mod fetch;
pub mod flow;
pub mod ports;
pub mod state;

#[cfg(test)]
pub(crate) mod mock;

// Re-exports
pub use fetch::*;
pub use flow::*;
pub use ports::*;
pub use state::*;
