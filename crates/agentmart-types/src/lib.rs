//! AgentMart Types - Canonical domain types for the agent marketplace
//!
//! This crate contains all foundational types for AgentMart with zero
//! dependencies on other agentmart crates. It defines:
//!
//! - Identity types (AgentId, PurchaseId, UserId)
//! - Atomic AMA amounts
//! - Agent listings and their pricing
//! - Ownership records and users
//! - Unsigned/signed transaction descriptors
//! - The shared error taxonomy
//!
//! # Purchase Invariants
//!
//! 1. A paid agent is never owned without a confirmed on-chain transfer
//! 2. A wallet holds at most one active ownership record per agent
//! 3. Agent stats only change through atomic increments

pub mod identity;
pub mod amount;
pub mod agent;
pub mod ownership;
pub mod user;
pub mod transaction;
pub mod error;

pub use identity::*;
pub use amount::*;
pub use agent::*;
pub use ownership::*;
pub use user::*;
pub use transaction::*;
pub use error::*;

/// Version of the AgentMart types schema
pub const TYPES_VERSION: &str = "0.1.0";

/// Minimum length of a wallet address accepted as an agent owner
pub const MIN_WALLET_ADDRESS_LEN: usize = 21;

/// Returns true if `address` looks like a wallet address.
///
/// Only a length check; the chain is the authority on address validity.
pub fn is_plausible_address(address: &str) -> bool {
    address.trim().len() >= MIN_WALLET_ADDRESS_LEN
}
