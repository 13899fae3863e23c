//! Ownership records
//!
//! Evidence that a wallet acquired an agent. At most one active record may
//! exist per (buyer, agent) pair; records are soft-deleted only.

use crate::{AgentId, AtomicAmount, PurchaseId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchase of an agent by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub id: PurchaseId,
    pub buyer_address: String,
    pub agent_id: AgentId,
    pub purchase_date: DateTime<Utc>,
    /// Copied from the listing at validation time
    pub purchase_price: AtomicAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    pub is_active: bool,
}

/// Fields supplied when recording a purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwnership {
    pub buyer_address: String,
    pub agent_id: AgentId,
    pub purchase_price: AtomicAmount,
    pub transaction_hash: Option<String>,
}

impl NewOwnership {
    pub fn into_record(self, id: PurchaseId, now: DateTime<Utc>) -> OwnershipRecord {
        OwnershipRecord {
            id,
            buyer_address: self.buyer_address,
            agent_id: self.agent_id,
            purchase_date: now,
            purchase_price: self.purchase_price,
            transaction_hash: self.transaction_hash,
            is_active: true,
        }
    }
}

/// Client-facing view of a purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub id: PurchaseId,
    pub agent_id: AgentId,
    pub purchase_date: DateTime<Utc>,
    pub purchase_price: AtomicAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl From<&OwnershipRecord> for PurchaseSummary {
    fn from(record: &OwnershipRecord) -> Self {
        Self {
            id: record.id,
            agent_id: record.agent_id,
            purchase_date: record.purchase_date,
            purchase_price: record.purchase_price,
            transaction_hash: record.transaction_hash.clone(),
        }
    }
}
