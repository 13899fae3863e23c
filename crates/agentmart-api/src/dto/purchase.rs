//! Purchase and ownership DTOs

use agentmart_db::OwnedAgent;
use agentmart_types::{Agent, PurchaseSummary};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Record purchase request, sent after the client confirmed the transfer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPurchaseRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 256, message = "Buyer address is too long"))]
    pub buyer_address: Option<String>,
    /// Confirmed transfer hash; required for paid agents
    #[serde(default)]
    #[validate(length(max = 256, message = "Transaction hash is too long"))]
    pub transaction_hash: Option<String>,
}

/// Record purchase response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordPurchaseResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub purchase: PurchaseSummary,
    pub message: String,
}

/// Owned agents query
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyAgentsQuery {
    #[serde(default)]
    pub user_address: Option<String>,
}

/// An owned agent with its purchase
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnedAgentEntry {
    #[schema(value_type = Object)]
    pub purchase: PurchaseSummary,
    #[schema(value_type = Object)]
    pub agent: Agent,
}

impl From<OwnedAgent> for OwnedAgentEntry {
    fn from(owned: OwnedAgent) -> Self {
        Self {
            purchase: PurchaseSummary::from(&owned.purchase),
            agent: owned.agent,
        }
    }
}

/// Owned agents response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyAgentsResponse {
    pub success: bool,
    pub data: Vec<OwnedAgentEntry>,
}
