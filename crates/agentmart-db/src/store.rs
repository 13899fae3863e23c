//! Catalog store abstraction
//!
//! The purchase flow and the HTTP surface only see [`CatalogStore`]; the
//! server picks PostgreSQL or the in-memory backend at startup.

use agentmart_types::{
    Agent, AgentId, AgentPage, AgentQuery, NewAgent, NewOwnership, NewUser, OwnershipRecord, User,
};
use async_trait::async_trait;
use serde::Serialize;

use crate::{DbResult, StoreBackend};

/// An active ownership joined with its agent
#[derive(Debug, Clone, Serialize)]
pub struct OwnedAgent {
    pub purchase: OwnershipRecord,
    pub agent: Agent,
}

/// Health of the store connection
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub backend: StoreBackend,
    pub healthy: bool,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn backend(&self) -> StoreBackend;

    async fn health_check(&self) -> DbResult<HealthStatus>;

    /// Release connections on shutdown
    async fn close(&self) {}

    // --- agents -------------------------------------------------------------

    /// Insert a listing. `(name, owner)` collisions fail with `Duplicate`.
    async fn create_agent(&self, agent: NewAgent) -> DbResult<Agent>;

    async fn find_agent(&self, id: AgentId) -> DbResult<Option<Agent>>;

    async fn list_agents(&self, query: &AgentQuery) -> DbResult<AgentPage>;

    /// Activate or deactivate a listing; listings are never deleted
    async fn set_agent_active(&self, id: AgentId, active: bool) -> DbResult<Agent>;

    /// Add one purchase and one subscriber in a single atomic update
    async fn increment_purchase_stats(&self, id: AgentId) -> DbResult<()>;

    // --- ownership ----------------------------------------------------------

    async fn find_active_ownership(
        &self,
        buyer_address: &str,
        agent_id: AgentId,
    ) -> DbResult<Option<OwnershipRecord>>;

    /// Conditional insert: fails with `Duplicate` when an active record for
    /// the same buyer and agent already exists.
    async fn insert_ownership(&self, record: NewOwnership) -> DbResult<OwnershipRecord>;

    /// Active records for `buyer_address`, newest first. Records whose
    /// agent is gone are skipped.
    async fn list_owned_agents(&self, buyer_address: &str) -> DbResult<Vec<OwnedAgent>>;

    // --- users --------------------------------------------------------------

    /// `public_key` collisions fail with `Duplicate`
    async fn create_user(&self, user: NewUser) -> DbResult<User>;

    async fn find_user(&self, public_key: &str) -> DbResult<Option<User>>;

    /// All users, newest first
    async fn list_users(&self) -> DbResult<Vec<User>>;
}
