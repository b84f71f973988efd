//! xlend-api: HTTP API layer for XLend
//!
//! Serves the four lending pages (lend, withdraw, borrow, repay) together
//! with the shared wallet, chain, token and selection resources.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, BusyGuard, Button};
