//! Agent listing repository

use agentmart_types::{Agent, AgentId, AgentPage, AgentQuery, AgentSort, NewAgent, SortOrder};
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::map_unique_violation;
use crate::models::AGENT_COLUMNS;
use crate::{DbAgent, DbError, DbResult};

const AGENT_NAME_OWNER_KEY: &str = "agents_name_owner_key";

/// Repository for catalog listings
pub struct AgentRepo {
    pool: PgPool,
}

impl AgentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new listing
    pub async fn create(&self, new: NewAgent) -> DbResult<Agent> {
        let agent = new.into_agent(AgentId::new(), Utc::now());
        let price = agent
            .pricing
            .amount()
            .to_i64()
            .ok_or_else(|| DbError::InvalidInput("price amount out of range".into()))?;
        let mcp_config = serde_json::to_value(&agent.mcp_config)?;
        let hosting = agent.hosting.as_ref().map(serde_json::to_value).transpose()?;
        let media = serde_json::to_value(&agent.media)?;

        let sql = format!(
            r#"
            INSERT INTO agents (
                id, name, description, category, tags, mcp_config, pricing_model,
                price_amount, currency, owner, hosting, media, is_verified, is_active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            RETURNING {AGENT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DbAgent>(&sql)
            .bind(agent.id.as_uuid())
            .bind(&agent.name)
            .bind(&agent.description)
            .bind(agent.category.as_str())
            .bind(&agent.tags)
            .bind(mcp_config)
            .bind(agent.pricing.model().as_str())
            .bind(price)
            .bind(&agent.pricing.currency)
            .bind(&agent.owner)
            .bind(hosting)
            .bind(media)
            .bind(agent.is_verified)
            .bind(agent.is_active)
            .bind(agent.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, AGENT_NAME_OWNER_KEY, || {
                    format!("Agent {} already exists for this owner", agent.name)
                })
            })?;

        row.try_into()
    }

    /// Find a listing by ID
    pub async fn find_by_id(&self, id: AgentId) -> DbResult<Option<Agent>> {
        let sql = format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1");
        let row = sqlx::query_as::<_, DbAgent>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Agent::try_from).transpose()
    }

    /// List listings matching `query`, with the total before paging
    pub async fn list(&self, query: &AgentQuery) -> DbResult<AgentPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM agents");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {AGENT_COLUMNS} FROM agents"));
        push_filters(&mut select, query);
        select.push(" ORDER BY ");
        select.push(sort_column(query.sort));
        select.push(match query.order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
        // Stable paging when the sort key ties
        select.push(", id ASC");
        select.push(" LIMIT ").push_bind(i64::from(query.limit));
        select.push(" OFFSET ").push_bind(i64::from(query.skip));

        let rows: Vec<DbAgent> = select.build_query_as().fetch_all(&self.pool).await?;
        let agents = rows
            .into_iter()
            .map(Agent::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(AgentPage {
            agents,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    /// Flip the activity flag
    pub async fn set_active(&self, id: AgentId, active: bool) -> DbResult<Agent> {
        let sql = format!(
            "UPDATE agents SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {AGENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DbAgent>(&sql)
            .bind(id.as_uuid())
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Agent {}", id)))?;

        row.try_into()
    }

    /// Increment purchase counters in one statement
    pub async fn increment_purchase_stats(&self, id: AgentId) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE agents
            SET total_purchases = total_purchases + 1,
                active_subscribers = active_subscribers + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Agent {}", id)));
        }

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AgentQuery) {
    builder.push(" WHERE is_active = ").push_bind(query.is_active);
    if let Some(category) = query.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(owner) = &query.owner {
        builder.push(" AND owner = ").push_bind(owner.clone());
    }
    if query.verified_only {
        builder.push(" AND is_verified = TRUE");
    }
}

fn sort_column(sort: AgentSort) -> &'static str {
    match sort {
        AgentSort::Date => "created_at",
        AgentSort::Rating => "average_rating",
        AgentSort::Purchases => "total_purchases",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_columns_are_whitelisted() {
        assert_eq!(sort_column(AgentSort::Date), "created_at");
        assert_eq!(sort_column(AgentSort::Rating), "average_rating");
        assert_eq!(sort_column(AgentSort::Purchases), "total_purchases");
    }

    #[test]
    fn test_filter_sql() {
        let query = AgentQuery {
            category: Some(agentmart_types::AgentCategory::Nft),
            verified_only: true,
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM agents");
        push_filters(&mut builder, &query);
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM agents WHERE is_active = $1 AND category = $2 AND is_verified = TRUE"
        );
    }
}
