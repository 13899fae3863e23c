//! Wallet signer capability
//!
//! Signing happens inside the user's wallet extension. The marketplace only
//! sees this trait; the wallet holds the keys.

use agentmart_types::{Classify, ErrorKind, SignedTransaction, UnsignedTransaction};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("Transaction rejected by user")]
    Rejected,

    #[error("Wallet is locked")]
    Locked,

    #[error("Wallet extension not available")]
    Unavailable,

    #[error("Signing failed: {0}")]
    Other(String),
}

impl Classify for SignerError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalService
    }
}

/// Signs unsigned transfer descriptors. Calls may wait on the user
/// indefinitely and are never retried.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign(&self, transaction: &UnsignedTransaction) -> Result<SignedTransaction, SignerError>;
}
