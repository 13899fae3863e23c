//! Purchase recorder
//!
//! The store-facing half of a purchase: availability checks, the ownership
//! pre-check, the conditional insert and the stats increment. Shared by the
//! orchestrator and the `POST /purchases` endpoint.

use std::sync::Arc;

use agentmart_db::{CatalogStore, DbError};
use agentmart_types::{Agent, AgentId, NewOwnership, OwnershipRecord, PricingModel};
use tracing::{debug, info, warn};

use crate::{PreconditionFailure, PurchaseError};

/// A purchase request as received from a client that already paid
#[derive(Debug, Clone)]
pub struct RecordPurchase {
    pub agent_id: AgentId,
    pub buyer_address: String,
    pub transaction_hash: Option<String>,
}

/// A successfully recorded purchase
#[derive(Debug, Clone)]
pub struct RecordedPurchase {
    pub record: OwnershipRecord,
    pub model: PricingModel,
}

impl RecordedPurchase {
    pub fn message(&self) -> &'static str {
        acquisition_message(self.model)
    }
}

/// User-facing confirmation for a recorded purchase
pub fn acquisition_message(model: PricingModel) -> &'static str {
    match model {
        PricingModel::Free => "Agent successfully added to your collection",
        PricingModel::Paid => "Purchase successful",
    }
}

#[derive(Clone)]
pub struct PurchaseRecorder {
    store: Arc<dyn CatalogStore>,
}

impl PurchaseRecorder {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Fetch the agent and require it to be active
    pub async fn load_purchasable(&self, agent_id: AgentId) -> Result<Agent, PurchaseError> {
        let agent = self
            .store
            .find_agent(agent_id)
            .await
            .map_err(|e| PurchaseError::store(e, None))?
            .ok_or(PurchaseError::precondition(PreconditionFailure::AgentNotFound(agent_id)))?;

        if !agent.is_active {
            return Err(PurchaseError::precondition(PreconditionFailure::AgentInactive(agent_id)));
        }
        Ok(agent)
    }

    /// Fail with `AlreadyOwned` when an active record exists
    pub async fn ensure_not_owned(&self, buyer_address: &str, agent_id: AgentId) -> Result<(), PurchaseError> {
        let existing = self
            .store
            .find_active_ownership(buyer_address, agent_id)
            .await
            .map_err(|e| PurchaseError::store(e, None))?;

        match existing {
            Some(record) => {
                debug!(purchase_id = %record.id, "Active ownership already exists");
                Err(PurchaseError::AlreadyOwned { transaction_hash: None })
            }
            None => Ok(()),
        }
    }

    /// Insert the record at the listing's current price.
    ///
    /// A duplicate at insert time is a lost race with a concurrent attempt
    /// and is reported as `AlreadyOwned`, keeping any confirmed hash.
    pub async fn insert_record(
        &self,
        agent: &Agent,
        buyer_address: &str,
        transaction_hash: Option<String>,
    ) -> Result<OwnershipRecord, PurchaseError> {
        let new = NewOwnership {
            buyer_address: buyer_address.to_string(),
            agent_id: agent.id,
            purchase_price: agent.pricing.amount(),
            transaction_hash: transaction_hash.clone(),
        };

        match self.store.insert_ownership(new).await {
            Ok(record) => {
                metrics::counter!("agentmart_purchases_recorded_total", "model" => agent.pricing.model().as_str())
                    .increment(1);
                info!(
                    purchase_id = %record.id,
                    agent_id = %agent.id,
                    buyer = %buyer_address,
                    price = %record.purchase_price,
                    "Purchase recorded"
                );
                Ok(record)
            }
            Err(DbError::Duplicate(detail)) => {
                debug!(%detail, "Ownership insert lost a race");
                Err(PurchaseError::AlreadyOwned { transaction_hash })
            }
            Err(e) => {
                warn!(error = %e, tx_hash = ?transaction_hash, "Failed to record purchase");
                Err(PurchaseError::store(e, transaction_hash))
            }
        }
    }

    /// Bump the agent's purchase counters. Runs only once a record exists,
    /// so a failure is logged and the purchase stands.
    pub async fn update_stats(&self, agent_id: AgentId) {
        if let Err(e) = self.store.increment_purchase_stats(agent_id).await {
            warn!(error = %e, agent_id = %agent_id, "Failed to update agent stats");
        }
    }

    /// Insert then update stats
    pub async fn commit(
        &self,
        agent: &Agent,
        buyer_address: &str,
        transaction_hash: Option<String>,
    ) -> Result<OwnershipRecord, PurchaseError> {
        let record = self.insert_record(agent, buyer_address, transaction_hash).await?;
        self.update_stats(agent.id).await;
        Ok(record)
    }

    /// Record a purchase reported by a client
    pub async fn record(&self, request: RecordPurchase) -> Result<RecordedPurchase, PurchaseError> {
        let result = self.try_record(request).await;
        if let Err(e) = &result {
            metrics::counter!("agentmart_purchases_rejected_total", "reason" => e.reason()).increment(1);
        }
        result
    }

    async fn try_record(&self, request: RecordPurchase) -> Result<RecordedPurchase, PurchaseError> {
        let agent = self.load_purchasable(request.agent_id).await?;
        self.ensure_not_owned(&request.buyer_address, agent.id).await?;

        let transaction_hash = request.transaction_hash.filter(|h| !h.trim().is_empty());
        if agent.pricing.charge().is_some() && transaction_hash.is_none() {
            return Err(PurchaseError::precondition(PreconditionFailure::PaymentRequired));
        }

        let record = self.commit(&agent, &request.buyer_address, transaction_hash).await?;
        Ok(RecordedPurchase {
            record,
            model: agent.pricing.model(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmart_db::MemoryStore;
    use agentmart_types::{AgentCategory, AgentMedia, McpConfig, McpProtocol, NewAgent, Pricing};

    const BUYER: &str = "buyer-wallet-address-000000";

    async fn recorder_with(pricing: Pricing) -> (PurchaseRecorder, Agent) {
        let store = Arc::new(MemoryStore::new());
        let agent = store
            .create_agent(NewAgent {
                name: "Scout".into(),
                description: "Scouts new token launches".into(),
                category: AgentCategory::Trading,
                tags: vec![],
                mcp_config: McpConfig {
                    server_url: "https://scout.example".into(),
                    protocol: McpProtocol::Sse,
                    transport: None,
                },
                pricing,
                owner: "owner-wallet-address-000000".into(),
                hosting: None,
                media: AgentMedia::default(),
            })
            .await
            .unwrap();
        (PurchaseRecorder::new(store), agent)
    }

    fn request(agent_id: AgentId, hash: Option<&str>) -> RecordPurchase {
        RecordPurchase {
            agent_id,
            buyer_address: BUYER.into(),
            transaction_hash: hash.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_record_free_purchase() {
        let (recorder, agent) = recorder_with(Pricing::free()).await;
        let recorded = recorder.record(request(agent.id, None)).await.unwrap();
        assert_eq!(recorded.message(), "Agent successfully added to your collection");
        assert!(recorded.record.purchase_price.is_zero());

        let agent = recorder.store().find_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(agent.stats.total_purchases, 1);
        assert_eq!(agent.stats.active_subscribers, 1);
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let (recorder, agent) = recorder_with(Pricing::free()).await;
        recorder.record(request(agent.id, None)).await.unwrap();
        let err = recorder.record(request(agent.id, None)).await.unwrap_err();
        assert!(matches!(err, PurchaseError::AlreadyOwned { transaction_hash: None }));

        let agent = recorder.store().find_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(agent.stats.total_purchases, 1);
    }

    #[tokio::test]
    async fn test_paid_requires_hash() {
        let (recorder, agent) = recorder_with(Pricing::paid(10u64)).await;
        let err = recorder.record(request(agent.id, Some("  "))).await.unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::PreconditionFailed(PreconditionFailure::PaymentRequired)
        ));

        let recorded = recorder.record(request(agent.id, Some("0xpaid"))).await.unwrap();
        assert_eq!(recorded.message(), "Purchase successful");
        assert_eq!(recorded.record.transaction_hash.as_deref(), Some("0xpaid"));
    }

    #[tokio::test]
    async fn test_inactive_and_missing_agents() {
        let (recorder, agent) = recorder_with(Pricing::free()).await;
        recorder.store().set_agent_active(agent.id, false).await.unwrap();

        let err = recorder.record(request(agent.id, None)).await.unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::PreconditionFailed(PreconditionFailure::AgentInactive(_))
        ));

        let err = recorder.record(request(AgentId::new(), None)).await.unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::PreconditionFailed(PreconditionFailure::AgentNotFound(_))
        ));
    }
}
