//! Purchase errors
//!
//! Every attempt ends in exactly one of these or in a recorded purchase.

use agentmart_chain::{BuildError, ChainError, SignerError};
use agentmart_db::DbError;
use agentmart_types::{AgentId, Classify, ErrorKind};
use thiserror::Error;

/// Why an attempt was refused before any side effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("Wallet signer not available")]
    SignerUnavailable,

    #[error("Agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("Agent is not available for purchase")]
    AgentInactive(AgentId),

    /// A paid listing was recorded without a transfer hash
    #[error("Transaction hash is required for paid agents")]
    PaymentRequired,
}

/// Upstream failure of the signing or submission step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionFailure {
    #[error(transparent)]
    Signing(#[from] SignerError),

    #[error(transparent)]
    Submission(#[from] ChainError),
}

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("{0}")]
    PreconditionFailed(PreconditionFailure),

    /// The buyer already holds an active record. When the duplicate was
    /// only detected at insert time the confirmed transfer hash is kept.
    #[error("You already own this agent")]
    AlreadyOwned { transaction_hash: Option<String> },

    #[error("Failed to build transaction: {0}")]
    TransactionBuildFailed(#[from] BuildError),

    #[error("Transaction failed: {0}")]
    TransactionFailed(#[from] TransactionFailure),

    /// The store failed. Funds may have moved when a hash is present.
    #[error("Failed to record purchase: {source}")]
    RecordingFailed {
        #[source]
        source: DbError,
        transaction_hash: Option<String>,
    },
}

impl PurchaseError {
    pub fn precondition(failure: PreconditionFailure) -> Self {
        Self::PreconditionFailed(failure)
    }

    pub(crate) fn store(source: DbError, transaction_hash: Option<String>) -> Self {
        Self::RecordingFailed {
            source,
            transaction_hash,
        }
    }

    /// Confirmed on-chain hash carried by the error, for reconciliation
    pub fn transaction_hash(&self) -> Option<&str> {
        match self {
            Self::AlreadyOwned { transaction_hash } | Self::RecordingFailed { transaction_hash, .. } => {
                transaction_hash.as_deref()
            }
            _ => None,
        }
    }

    /// Short label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::AlreadyOwned { .. } => "already_owned",
            Self::TransactionBuildFailed(_) => "build_failed",
            Self::TransactionFailed(_) => "transaction_failed",
            Self::RecordingFailed { .. } => "recording_failed",
        }
    }
}

impl From<SignerError> for PurchaseError {
    fn from(e: SignerError) -> Self {
        Self::TransactionFailed(TransactionFailure::Signing(e))
    }
}

impl From<ChainError> for PurchaseError {
    fn from(e: ChainError) -> Self {
        Self::TransactionFailed(TransactionFailure::Submission(e))
    }
}

impl Classify for PurchaseError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionFailed(PreconditionFailure::AgentNotFound(_)) => ErrorKind::NotFound,
            Self::PreconditionFailed(_) => ErrorKind::Validation,
            Self::AlreadyOwned { .. } => ErrorKind::Conflict,
            Self::TransactionBuildFailed(_) => ErrorKind::Validation,
            Self::TransactionFailed(_) => ErrorKind::ExternalService,
            Self::RecordingFailed { .. } => ErrorKind::Store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let not_found = PurchaseError::precondition(PreconditionFailure::AgentNotFound(AgentId::new()));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let rejected: PurchaseError = SignerError::Rejected.into();
        assert_eq!(rejected.kind(), ErrorKind::ExternalService);
        assert_eq!(rejected.to_string(), "Transaction failed: Transaction rejected by user");

        let recording = PurchaseError::store(DbError::Connection("down".into()), Some("0xabc".into()));
        assert_eq!(recording.kind(), ErrorKind::Store);
        assert_eq!(recording.transaction_hash(), Some("0xabc"));
    }
}
