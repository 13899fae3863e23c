//! Wallet session handed to the orchestrator

use std::fmt;
use std::sync::Arc;

use agentmart_chain::WalletSigner;

/// The buyer's wallet as seen by one purchase attempt
#[derive(Clone, Default)]
pub struct WalletSession {
    /// Connected account address, if any
    pub address: Option<String>,
    /// Signing capability; absent when the extension is missing or locked
    pub signer: Option<Arc<dyn WalletSigner>>,
}

impl WalletSession {
    pub fn connected(address: impl Into<String>, signer: Arc<dyn WalletSigner>) -> Self {
        Self {
            address: Some(address.into()),
            signer: Some(signer),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Trimmed account address, `None` when blank
    pub fn buyer_address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.address)
            .field("signer", &self.signer.is_some())
            .finish()
    }
}
