//! xlend-core: Shared types, errors, chain table and configuration
//!
//! This crate provides the foundational types used across the XLend workspace.

pub mod chains;
pub mod config;
pub mod errors;
pub mod types;

pub use chains::*;
pub use config::*;
pub use errors::*;
pub use types::*;
