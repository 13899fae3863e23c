//! Purchase orchestrator
//!
//! Drives one attempt through
//! `Validating -> CheckingOwnership -> [Building -> Signing -> Submitting] ->
//! Recording -> UpdatingStats -> Done`. The bracketed steps only run for
//! listings that charge a non-zero amount. Nothing is retried and no record
//! exists unless the attempt reaches `Done`.

use std::fmt;
use std::sync::Arc;

use agentmart_chain::{build_transfer, ChainSubmitter};
use agentmart_db::CatalogStore;
use agentmart_types::{AgentId, PricingModel, PurchaseSummary};
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::recorder::acquisition_message;
use crate::{PreconditionFailure, PurchaseError, PurchaseRecorder, WalletSession};

/// Steps of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStage {
    Validating,
    CheckingOwnership,
    Building,
    Signing,
    Submitting,
    Recording,
    UpdatingStats,
    Done,
}

impl PurchaseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::CheckingOwnership => "checking_ownership",
            Self::Building => "building",
            Self::Signing => "signing",
            Self::Submitting => "submitting",
            Self::Recording => "recording",
            Self::UpdatingStats => "updating_stats",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PurchaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed purchase
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub purchase: PurchaseSummary,
    pub model: PricingModel,
    pub message: &'static str,
}

pub struct PurchaseOrchestrator {
    recorder: PurchaseRecorder,
    submitter: Arc<dyn ChainSubmitter>,
}

impl PurchaseOrchestrator {
    pub fn new(store: Arc<dyn CatalogStore>, submitter: Arc<dyn ChainSubmitter>) -> Self {
        Self {
            recorder: PurchaseRecorder::new(store),
            submitter,
        }
    }

    pub fn recorder(&self) -> &PurchaseRecorder {
        &self.recorder
    }

    /// Run one purchase attempt for `agent_id` with the given wallet.
    ///
    /// Pricing and owner are read from the store at attempt time.
    pub async fn purchase(
        &self,
        agent_id: AgentId,
        wallet: &WalletSession,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        let span = info_span!(
            "purchase",
            agent_id = %agent_id,
            buyer = wallet.buyer_address().unwrap_or("-"),
        );

        let result = self.run(agent_id, wallet).instrument(span).await;
        if let Err(e) = &result {
            metrics::counter!("agentmart_purchases_rejected_total", "reason" => e.reason()).increment(1);
        }
        result
    }

    async fn run(&self, agent_id: AgentId, wallet: &WalletSession) -> Result<PurchaseReceipt, PurchaseError> {
        enter(PurchaseStage::Validating);
        let buyer = wallet
            .buyer_address()
            .ok_or(PurchaseError::precondition(PreconditionFailure::WalletNotConnected))?;
        let signer = wallet
            .signer
            .as_ref()
            .ok_or(PurchaseError::precondition(PreconditionFailure::SignerUnavailable))?;
        let agent = self.recorder.load_purchasable(agent_id).await?;

        enter(PurchaseStage::CheckingOwnership);
        self.recorder.ensure_not_owned(buyer, agent.id).await?;

        let transaction_hash = match agent.pricing.charge() {
            None => {
                debug!("Free listing, skipping payment");
                None
            }
            Some(amount) => {
                enter(PurchaseStage::Building);
                let unsigned = build_transfer(&agent.owner, amount)?;

                enter(PurchaseStage::Signing);
                let signed = signer.sign(&unsigned).await.map_err(|e| {
                    warn!(error = %e, "Wallet did not sign");
                    PurchaseError::from(e)
                })?;
                debug!(preliminary_hash = %signed.tx_hash, "Transaction signed");

                enter(PurchaseStage::Submitting);
                let receipt = self.submitter.submit(&signed.tx_packed).await.map_err(|e| {
                    metrics::counter!("agentmart_transactions_submitted_total", "outcome" => "failed")
                        .increment(1);
                    warn!(error = %e, "Submission failed");
                    PurchaseError::from(e)
                })?;
                metrics::counter!("agentmart_transactions_submitted_total", "outcome" => "confirmed")
                    .increment(1);
                info!(tx_hash = %receipt.tx_hash, amount = %amount, "Payment confirmed");
                Some(receipt.tx_hash)
            }
        };

        enter(PurchaseStage::Recording);
        let record = self.recorder.insert_record(&agent, buyer, transaction_hash).await?;

        enter(PurchaseStage::UpdatingStats);
        self.recorder.update_stats(agent.id).await;

        enter(PurchaseStage::Done);
        let model = agent.pricing.model();
        Ok(PurchaseReceipt {
            purchase: PurchaseSummary::from(&record),
            model,
            message: acquisition_message(model),
        })
    }
}

fn enter(stage: PurchaseStage) {
    debug!(stage = %stage, "Purchase stage");
}
