//! Error taxonomy shared by every AgentMart crate
//!
//! Each crate keeps its own error enum; this module only defines the coarse
//! classification callers use to pick a user-facing state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse error class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or unmet precondition; never retried automatically
    Validation,
    /// Agent or user missing
    NotFound,
    /// Duplicate name or duplicate ownership
    Conflict,
    /// Wallet unavailable or rejected, node unreachable
    ExternalService,
    /// Database unavailable or an unclassified constraint violation
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ExternalService => "external_service",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by error enums that participate in the taxonomy
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
