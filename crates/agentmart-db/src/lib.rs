//! AgentMart Catalog Store
//!
//! Persistence for agent listings, ownership records and users.
//!
//! # Backends
//!
//! - **PostgreSQL** ([`Database`]): production store. Uniqueness is enforced
//!   by the schema: `(name, owner)` on agents, `public_key` on users and a
//!   partial unique index over active `(buyer_address, agent_id)` ownerships.
//! - **Memory** ([`MemoryStore`]): single-process store for development and
//!   tests with the same guarantees.
//!
//! Both implement [`CatalogStore`], which is what the rest of the workspace
//! depends on.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

use agentmart_types::{
    Agent, AgentId, AgentPage, AgentQuery, NewAgent, NewOwnership, NewUser, OwnershipRecord, User,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{info, warn};

pub use config::{DatabaseConfig, StoreBackend};
pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use models::*;
pub use repos::*;
pub use store::{CatalogStore, HealthStatus, OwnedAgent};

/// PostgreSQL-backed catalog store
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");
        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pg.close().await;
        info!("PostgreSQL pool closed");
    }

    pub fn agent_repo(&self) -> AgentRepo {
        AgentRepo::new(self.pg.clone())
    }

    pub fn ownership_repo(&self) -> OwnershipRepo {
        OwnershipRepo::new(self.pg.clone())
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.pg.clone())
    }
}

#[async_trait]
impl CatalogStore for Database {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn health_check(&self) -> DbResult<HealthStatus> {
        let healthy = match sqlx::query("SELECT 1").fetch_one(&self.pg).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "PostgreSQL health check failed");
                false
            }
        };
        Ok(HealthStatus {
            backend: StoreBackend::Postgres,
            healthy,
        })
    }

    async fn close(&self) {
        Database::close(self).await
    }

    async fn create_agent(&self, agent: NewAgent) -> DbResult<Agent> {
        self.agent_repo().create(agent).await
    }

    async fn find_agent(&self, id: AgentId) -> DbResult<Option<Agent>> {
        self.agent_repo().find_by_id(id).await
    }

    async fn list_agents(&self, query: &AgentQuery) -> DbResult<AgentPage> {
        self.agent_repo().list(query).await
    }

    async fn set_agent_active(&self, id: AgentId, active: bool) -> DbResult<Agent> {
        self.agent_repo().set_active(id, active).await
    }

    async fn increment_purchase_stats(&self, id: AgentId) -> DbResult<()> {
        self.agent_repo().increment_purchase_stats(id).await
    }

    async fn find_active_ownership(
        &self,
        buyer_address: &str,
        agent_id: AgentId,
    ) -> DbResult<Option<OwnershipRecord>> {
        self.ownership_repo().find_active(buyer_address, agent_id).await
    }

    async fn insert_ownership(&self, record: NewOwnership) -> DbResult<OwnershipRecord> {
        self.ownership_repo().insert(record).await
    }

    async fn list_owned_agents(&self, buyer_address: &str) -> DbResult<Vec<OwnedAgent>> {
        self.ownership_repo().list_owned(buyer_address).await
    }

    async fn create_user(&self, user: NewUser) -> DbResult<User> {
        self.user_repo().create(user).await
    }

    async fn find_user(&self, public_key: &str) -> DbResult<Option<User>> {
        self.user_repo().find_by_public_key(public_key).await
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        self.user_repo().list().await
    }
}

/// Build the store selected by `config`, running migrations when asked
pub async fn open_store(config: &DatabaseConfig) -> DbResult<Arc<dyn CatalogStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory catalog store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db = Database::connect(config).await?;
            if config.run_migrations {
                db.migrate().await?;
            }
            Ok(Arc::new(db))
        }
    }
}
