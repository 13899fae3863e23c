//! AgentMart Purchase - orchestration of agent purchases
//!
//! A purchase moves funds on-chain (for paid listings) and then records
//! ownership in the catalog store:
//!
//! 1. Validate the wallet session and the listing
//! 2. Refuse if the buyer already owns the agent
//! 3. Build, sign and submit a `Coin.transfer` to the listing owner
//! 4. Insert the ownership record, then bump the agent's stats
//!
//! [`PurchaseOrchestrator`] runs the whole sequence; [`PurchaseRecorder`]
//! is the store-facing half, also used directly by the HTTP surface.

pub mod error;
pub mod orchestrator;
pub mod recorder;
pub mod session;

pub use error::{PreconditionFailure, PurchaseError, TransactionFailure};
pub use orchestrator::{PurchaseOrchestrator, PurchaseReceipt, PurchaseStage};
pub use recorder::{acquisition_message, PurchaseRecorder, RecordPurchase, RecordedPurchase};
pub use session::WalletSession;
