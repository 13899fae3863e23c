//! Ownership (purchase) repository

use agentmart_types::{Agent, AgentId, NewOwnership, OwnershipRecord, PurchaseId};
use chrono::Utc;
use sqlx::{FromRow, PgPool, Row};

use crate::error::map_unique_violation;
use crate::models::OWNERSHIP_COLUMNS;
use crate::{DbAgent, DbError, DbOwnership, DbResult, OwnedAgent};

/// Partial unique index over active `(buyer_address, agent_id)` pairs
pub const ACTIVE_OWNERSHIP_INDEX: &str = "owned_agents_active_buyer_agent_idx";

pub struct OwnershipRepo {
    pool: PgPool,
}

impl OwnershipRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the active record for a buyer and agent
    pub async fn find_active(
        &self,
        buyer_address: &str,
        agent_id: AgentId,
    ) -> DbResult<Option<OwnershipRecord>> {
        let sql = format!(
            "SELECT {OWNERSHIP_COLUMNS} FROM owned_agents \
             WHERE buyer_address = $1 AND agent_id = $2 AND is_active"
        );
        let row = sqlx::query_as::<_, DbOwnership>(&sql)
            .bind(buyer_address)
            .bind(agent_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(OwnershipRecord::try_from).transpose()
    }

    /// Insert an active record; the partial unique index rejects a second
    /// active record for the same pair.
    pub async fn insert(&self, new: NewOwnership) -> DbResult<OwnershipRecord> {
        let record = new.into_record(PurchaseId::new(), Utc::now());
        let price = record
            .purchase_price
            .to_i64()
            .ok_or_else(|| DbError::InvalidInput("purchase price out of range".into()))?;

        let sql = format!(
            r#"
            INSERT INTO owned_agents (
                id, buyer_address, agent_id, purchase_date, purchase_price, transaction_hash, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING {OWNERSHIP_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DbOwnership>(&sql)
            .bind(record.id.as_uuid())
            .bind(&record.buyer_address)
            .bind(record.agent_id.as_uuid())
            .bind(record.purchase_date)
            .bind(price)
            .bind(&record.transaction_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, ACTIVE_OWNERSHIP_INDEX, || {
                    format!("Agent {} already owned by {}", record.agent_id, record.buyer_address)
                })
            })?;

        row.try_into()
    }

    /// Active records for a buyer joined with their agents, newest first
    pub async fn list_owned(&self, buyer_address: &str) -> DbResult<Vec<OwnedAgent>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id AS purchase_id, o.buyer_address, o.agent_id, o.purchase_date,
                o.purchase_price, o.transaction_hash, o.is_active AS purchase_active,
                a.id, a.name, a.description, a.category, a.tags, a.mcp_config,
                a.pricing_model, a.price_amount, a.currency, a.owner, a.hosting, a.media,
                a.is_verified, a.is_active, a.total_purchases, a.active_subscribers,
                a.average_rating, a.total_reviews, a.created_at, a.updated_at
            FROM owned_agents o
            JOIN agents a ON a.id = o.agent_id
            WHERE o.buyer_address = $1 AND o.is_active
            ORDER BY o.purchase_date DESC
            "#,
        )
        .bind(buyer_address)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DbResult<OwnedAgent> {
                let purchase = DbOwnership {
                    id: row.try_get("purchase_id")?,
                    buyer_address: row.try_get("buyer_address")?,
                    agent_id: row.try_get("agent_id")?,
                    purchase_date: row.try_get("purchase_date")?,
                    purchase_price: row.try_get("purchase_price")?,
                    transaction_hash: row.try_get("transaction_hash")?,
                    is_active: row.try_get("purchase_active")?,
                };
                let agent = DbAgent::from_row(row)?;
                Ok(OwnedAgent {
                    purchase: OwnershipRecord::try_from(purchase)?,
                    agent: Agent::try_from(agent)?,
                })
            })
            .collect()
    }
}
