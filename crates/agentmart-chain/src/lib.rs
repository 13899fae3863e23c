//! AgentMart Chain - everything between a purchase and the blockchain
//!
//! - [`builder`]: pure construction of `Coin.transfer` descriptors
//! - [`signer`]: the wallet signing capability
//! - [`submitter`]: node submission, with an HTTP client for real nodes

pub mod builder;
pub mod signer;
pub mod submitter;

pub use builder::{build_transfer, build_transfer_from_json, BuildError};
pub use signer::{SignerError, WalletSigner};
pub use submitter::{ChainError, ChainSubmitter, NodeClient, NodeConfig};
