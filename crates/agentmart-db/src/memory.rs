//! In-memory catalog store
//!
//! Every operation takes the same lock, so the ownership insert is a true
//! conditional insert and stat increments never interleave.

use std::cmp::Ordering;

use agentmart_types::{
    Agent, AgentId, AgentPage, AgentQuery, AgentSort, NewAgent, NewOwnership, NewUser,
    OwnershipRecord, PurchaseId, SortOrder, User, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{CatalogStore, DbError, DbResult, HealthStatus, OwnedAgent, StoreBackend};

#[derive(Default)]
struct Tables {
    agents: Vec<Agent>,
    ownerships: Vec<OwnershipRecord>,
    users: Vec<User>,
}

/// Process-local [`CatalogStore`] for development and tests
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ownership records, active or not
    pub fn ownership_count(&self) -> usize {
        self.tables.lock().ownerships.len()
    }
}

fn compare(a: &Agent, b: &Agent, sort: AgentSort) -> Ordering {
    match sort {
        AgentSort::Date => a.created_at.cmp(&b.created_at),
        AgentSort::Rating => a.stats.average_rating.total_cmp(&b.stats.average_rating),
        AgentSort::Purchases => a.stats.total_purchases.cmp(&b.stats.total_purchases),
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn health_check(&self) -> DbResult<HealthStatus> {
        Ok(HealthStatus {
            backend: StoreBackend::Memory,
            healthy: true,
        })
    }

    async fn create_agent(&self, agent: NewAgent) -> DbResult<Agent> {
        let mut tables = self.tables.lock();
        if tables
            .agents
            .iter()
            .any(|a| a.name == agent.name && a.owner == agent.owner)
        {
            return Err(DbError::Duplicate(format!(
                "Agent {} already exists for this owner",
                agent.name
            )));
        }
        let agent = agent.into_agent(AgentId::new(), Utc::now());
        tables.agents.push(agent.clone());
        Ok(agent)
    }

    async fn find_agent(&self, id: AgentId) -> DbResult<Option<Agent>> {
        Ok(self.tables.lock().agents.iter().find(|a| a.id == id).cloned())
    }

    async fn list_agents(&self, query: &AgentQuery) -> DbResult<AgentPage> {
        let tables = self.tables.lock();
        let mut matching: Vec<&Agent> = tables.agents.iter().filter(|a| query.matches(a)).collect();
        matching.sort_by(|a, b| {
            let ord = compare(a, b, query.sort);
            let ord = match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let agents = matching
            .into_iter()
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(AgentPage { agents, total })
    }

    async fn set_agent_active(&self, id: AgentId, active: bool) -> DbResult<Agent> {
        let mut tables = self.tables.lock();
        let agent = tables
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Agent {}", id)))?;
        agent.is_active = active;
        agent.updated_at = Utc::now();
        Ok(agent.clone())
    }

    async fn increment_purchase_stats(&self, id: AgentId) -> DbResult<()> {
        let mut tables = self.tables.lock();
        let agent = tables
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Agent {}", id)))?;
        agent.stats.total_purchases += 1;
        agent.stats.active_subscribers += 1;
        agent.updated_at = Utc::now();
        Ok(())
    }

    async fn find_active_ownership(
        &self,
        buyer_address: &str,
        agent_id: AgentId,
    ) -> DbResult<Option<OwnershipRecord>> {
        let tables = self.tables.lock();
        Ok(tables
            .ownerships
            .iter()
            .find(|o| o.is_active && o.buyer_address == buyer_address && o.agent_id == agent_id)
            .cloned())
    }

    async fn insert_ownership(&self, record: NewOwnership) -> DbResult<OwnershipRecord> {
        let mut tables = self.tables.lock();
        if tables.ownerships.iter().any(|o| {
            o.is_active && o.buyer_address == record.buyer_address && o.agent_id == record.agent_id
        }) {
            return Err(DbError::Duplicate(format!(
                "Agent {} already owned by {}",
                record.agent_id, record.buyer_address
            )));
        }
        if !tables.agents.iter().any(|a| a.id == record.agent_id) {
            return Err(DbError::Constraint(format!("Agent {} does not exist", record.agent_id)));
        }
        let record = record.into_record(PurchaseId::new(), Utc::now());
        tables.ownerships.push(record.clone());
        Ok(record)
    }

    async fn list_owned_agents(&self, buyer_address: &str) -> DbResult<Vec<OwnedAgent>> {
        let tables = self.tables.lock();
        let mut owned: Vec<OwnedAgent> = tables
            .ownerships
            .iter()
            .filter(|o| o.is_active && o.buyer_address == buyer_address)
            .filter_map(|o| {
                let agent = tables.agents.iter().find(|a| a.id == o.agent_id)?;
                Some(OwnedAgent {
                    purchase: o.clone(),
                    agent: agent.clone(),
                })
            })
            .collect();
        owned.sort_by(|a, b| b.purchase.purchase_date.cmp(&a.purchase.purchase_date));
        Ok(owned)
    }

    async fn create_user(&self, user: NewUser) -> DbResult<User> {
        let mut tables = self.tables.lock();
        if tables.users.iter().any(|u| u.public_key == user.public_key) {
            return Err(DbError::Duplicate(format!("User {} already exists", user.public_key)));
        }
        let user = user.into_user(UserId::new(), Utc::now());
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, public_key: &str) -> DbResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.public_key == public_key)
            .cloned())
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        let mut users = self.tables.lock().users.clone();
        // Insertion order breaks timestamp ties
        users.reverse();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmart_types::{AgentCategory, AgentMedia, AtomicAmount, McpConfig, McpProtocol, Pricing};
    use std::sync::Arc;

    const OWNER: &str = "owner-wallet-address-000000";
    const BUYER: &str = "buyer-wallet-address-000000";

    fn new_agent(name: &str) -> NewAgent {
        NewAgent {
            name: name.into(),
            description: "An agent used in store tests".into(),
            category: AgentCategory::Research,
            tags: vec![],
            mcp_config: McpConfig {
                server_url: "https://agent.example".into(),
                protocol: McpProtocol::Sse,
                transport: None,
            },
            pricing: Pricing::paid(10u64),
            owner: OWNER.into(),
            hosting: None,
            media: AgentMedia::default(),
        }
    }

    fn purchase(agent_id: AgentId) -> NewOwnership {
        NewOwnership {
            buyer_address: BUYER.into(),
            agent_id,
            purchase_price: AtomicAmount(10),
            transaction_hash: Some("0xabc".into()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_agent_name_per_owner() {
        let store = MemoryStore::new();
        store.create_agent(new_agent("Alpha")).await.unwrap();
        let err = store.create_agent(new_agent("Alpha")).await.unwrap_err();
        assert!(err.is_duplicate());

        let mut other_owner = new_agent("Alpha");
        other_owner.owner = "another-owner-address-000".into();
        assert!(store.create_agent(other_owner).await.is_ok());
    }

    #[tokio::test]
    async fn test_insert_ownership_is_conditional() {
        let store = MemoryStore::new();
        let agent = store.create_agent(new_agent("Alpha")).await.unwrap();

        store.insert_ownership(purchase(agent.id)).await.unwrap();
        let err = store.insert_ownership(purchase(agent.id)).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.ownership_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_ownership_unknown_agent_is_not_duplicate() {
        let store = MemoryStore::new();
        let err = store.insert_ownership(purchase(AgentId::new())).await.unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_concurrent_stat_increments() {
        let store = Arc::new(MemoryStore::new());
        let agent = store.create_agent(new_agent("Alpha")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_purchase_stats(agent.id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let agent = store.find_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(agent.stats.total_purchases, 16);
        assert_eq!(agent.stats.active_subscribers, 16);
    }

    #[tokio::test]
    async fn test_increment_missing_agent() {
        let store = MemoryStore::new();
        let err = store.increment_purchase_stats(AgentId::new()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_agents_paging_and_sort() {
        let store = MemoryStore::new();
        for name in ["Alpha", "Bravo", "Charlie"] {
            store.create_agent(new_agent(name)).await.unwrap();
        }
        let bravo = store.list_agents(&AgentQuery::default()).await.unwrap().agents[1].id;
        store.increment_purchase_stats(bravo).await.unwrap();

        let query = AgentQuery {
            sort: AgentSort::Purchases,
            limit: 2,
            ..Default::default()
        };
        let page = store.list_agents(&query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.agents.len(), 2);
        assert_eq!(page.agents[0].id, bravo);

        let tail = store
            .list_agents(&AgentQuery { skip: 2, ..query })
            .await
            .unwrap();
        assert_eq!(tail.agents.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_agents_hidden_by_default() {
        let store = MemoryStore::new();
        let agent = store.create_agent(new_agent("Alpha")).await.unwrap();
        store.set_agent_active(agent.id, false).await.unwrap();

        assert_eq!(store.list_agents(&AgentQuery::default()).await.unwrap().total, 0);
        let inactive = AgentQuery { is_active: false, ..Default::default() };
        assert_eq!(store.list_agents(&inactive).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_owned_agents_joined_with_agent() {
        let store = MemoryStore::new();
        let agent = store.create_agent(new_agent("Alpha")).await.unwrap();
        store.insert_ownership(purchase(agent.id)).await.unwrap();

        let owned = store.list_owned_agents(BUYER).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].agent.name, "Alpha");
        assert!(store.list_owned_agents(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users() {
        let store = MemoryStore::new();
        store
            .create_user(NewUser::normalized(" pk-1 ", Some("Ada"), None))
            .await
            .unwrap();
        let err = store
            .create_user(NewUser::normalized("pk-1", None, None))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());

        store.create_user(NewUser::normalized("pk-2", None, None)).await.unwrap();
        let users = store.list_users().await.unwrap();
        assert_eq!(users[0].public_key, "pk-2");
        assert!(store.find_user("pk-1").await.unwrap().is_some());
        assert!(store.find_user("pk-3").await.unwrap().is_none());
    }
}
