//! Database models - mapped from PostgreSQL tables

use agentmart_types::{
    Agent, AgentCategory, AgentId, AgentMedia, AgentStats, AtomicAmount, Hosting, McpConfig,
    OwnershipRecord, PricePlan, Pricing, PricingModel, PurchaseId, User, UserId, UserRole,
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::DbError;

// ============================================================================
// Agent Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbAgent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub mcp_config: serde_json::Value,
    pub pricing_model: String,
    pub price_amount: i64,
    pub currency: String,
    pub owner: String,
    pub hosting: Option<serde_json::Value>,
    pub media: serde_json::Value,
    pub is_verified: bool,
    pub is_active: bool,
    pub total_purchases: i64,
    pub active_subscribers: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const AGENT_COLUMNS: &str = "id, name, description, category, tags, mcp_config, \
    pricing_model, price_amount, currency, owner, hosting, media, is_verified, is_active, \
    total_purchases, active_subscribers, average_rating, total_reviews, created_at, updated_at";

fn non_negative(value: i64, column: &str) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::Serialization(format!("negative {}: {}", column, value)))
}

impl TryFrom<DbAgent> for Agent {
    type Error = DbError;

    fn try_from(row: DbAgent) -> Result<Self, Self::Error> {
        let category: AgentCategory = row.category.parse().map_err(DbError::Serialization)?;
        let model: PricingModel = row.pricing_model.parse().map_err(DbError::Serialization)?;
        let amount = AtomicAmount(non_negative(row.price_amount, "price_amount")?);
        let plan = match model {
            PricingModel::Free => PricePlan::Free,
            PricingModel::Paid => PricePlan::Paid { amount },
        };
        let mcp_config: McpConfig = serde_json::from_value(row.mcp_config)?;
        let hosting: Option<Hosting> = row.hosting.map(serde_json::from_value).transpose()?;
        let media: AgentMedia = serde_json::from_value(row.media)?;

        Ok(Agent {
            id: AgentId::from(row.id),
            name: row.name,
            description: row.description,
            category,
            tags: row.tags,
            mcp_config,
            pricing: Pricing { plan, currency: row.currency },
            owner: row.owner,
            hosting,
            media,
            is_verified: row.is_verified,
            is_active: row.is_active,
            stats: AgentStats {
                total_purchases: non_negative(row.total_purchases, "total_purchases")?,
                active_subscribers: non_negative(row.active_subscribers, "active_subscribers")?,
                average_rating: row.average_rating,
                total_reviews: non_negative(row.total_reviews, "total_reviews")?,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ============================================================================
// Ownership Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbOwnership {
    pub id: Uuid,
    pub buyer_address: String,
    pub agent_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub purchase_price: i64,
    pub transaction_hash: Option<String>,
    pub is_active: bool,
}

pub(crate) const OWNERSHIP_COLUMNS: &str =
    "id, buyer_address, agent_id, purchase_date, purchase_price, transaction_hash, is_active";

impl TryFrom<DbOwnership> for OwnershipRecord {
    type Error = DbError;

    fn try_from(row: DbOwnership) -> Result<Self, Self::Error> {
        Ok(OwnershipRecord {
            id: PurchaseId::from(row.id),
            buyer_address: row.buyer_address,
            agent_id: AgentId::from(row.agent_id),
            purchase_date: row.purchase_date,
            purchase_price: AtomicAmount(non_negative(row.purchase_price, "purchase_price")?),
            transaction_hash: row.transaction_hash,
            is_active: row.is_active,
        })
    }
}

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub public_key: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const USER_COLUMNS: &str = "id, public_key, name, role, created_at, updated_at";

impl TryFrom<DbUser> for User {
    type Error = DbError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let role: UserRole = row.role.parse().map_err(DbError::Serialization)?;
        Ok(User {
            id: UserId::from(row.id),
            public_key: row.public_key,
            name: row.name,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent_row() -> DbAgent {
        let now = Utc::now();
        DbAgent {
            id: Uuid::new_v4(),
            name: "Alpha".into(),
            description: "Finds alpha on chain".into(),
            category: "defi".into(),
            tags: vec!["yield".into()],
            mcp_config: json!({"serverUrl": "https://alpha.example", "protocol": "sse"}),
            pricing_model: "paid".into(),
            price_amount: 5_000_000_000,
            currency: "AMA".into(),
            owner: "owner-wallet-address-000000".into(),
            hosting: None,
            media: json!({}),
            is_verified: false,
            is_active: true,
            total_purchases: 3,
            active_subscribers: 3,
            average_rating: 4.5,
            total_reviews: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_agent_row_conversion() {
        let agent = Agent::try_from(agent_row()).unwrap();
        assert_eq!(agent.category, AgentCategory::Defi);
        assert_eq!(agent.pricing.charge(), Some(AtomicAmount(5_000_000_000)));
        assert_eq!(agent.stats.total_purchases, 3);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut row = agent_row();
        row.price_amount = -1;
        assert!(matches!(Agent::try_from(row), Err(DbError::Serialization(_))));
    }
}
