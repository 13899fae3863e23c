//! Agent listing types
//!
//! An agent is a purchasable catalog entry backed by an MCP server. Listings
//! are owned by the wallet that registered them and are never deleted, only
//! deactivated.

use crate::{AgentId, AtomicAmount, AMA_SYMBOL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog category of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Trading,
    Analysis,
    Defi,
    Nft,
    Automation,
    Gaming,
    Social,
    Research,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 8] = [
        Self::Trading,
        Self::Analysis,
        Self::Defi,
        Self::Nft,
        Self::Automation,
        Self::Gaming,
        Self::Social,
        Self::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trading => "trading",
            Self::Analysis => "analysis",
            Self::Defi => "defi",
            Self::Nft => "nft",
            Self::Automation => "automation",
            Self::Gaming => "gaming",
            Self::Social => "social",
            Self::Research => "research",
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentCategory {
    type Err = String;

    /// Case-insensitive, matching how listings are filtered
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// MCP wire protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpProtocol {
    Stdio,
    #[default]
    Sse,
}

/// MCP transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    Http,
    Websocket,
}

/// How to reach the agent's MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpConfig {
    pub server_url: String,
    #[serde(default)]
    pub protocol: McpProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<McpTransport>,
}

// ============================================================================
// Pricing
// ============================================================================

/// What a buyer is charged.
///
/// Free listings carry no amount at all, so the purchase flow never needs a
/// recipient or amount for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePlan {
    Free,
    Paid { amount: AtomicAmount },
}

/// Listing price with its currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PricingDoc", into = "PricingDoc")]
pub struct Pricing {
    pub plan: PricePlan,
    pub currency: String,
}

impl Pricing {
    pub fn free() -> Self {
        Self {
            plan: PricePlan::Free,
            currency: AMA_SYMBOL.to_string(),
        }
    }

    pub fn paid(amount: impl Into<AtomicAmount>) -> Self {
        Self {
            plan: PricePlan::Paid { amount: amount.into() },
            currency: AMA_SYMBOL.to_string(),
        }
    }

    /// Amount recorded as the purchase price (zero for free listings)
    pub fn amount(&self) -> AtomicAmount {
        match self.plan {
            PricePlan::Free => AtomicAmount::ZERO,
            PricePlan::Paid { amount } => amount,
        }
    }

    /// Amount that must move on-chain, if any
    pub fn charge(&self) -> Option<AtomicAmount> {
        match self.plan {
            PricePlan::Paid { amount } if !amount.is_zero() => Some(amount),
            _ => None,
        }
    }

    pub fn model(&self) -> PricingModel {
        match self.plan {
            PricePlan::Free => PricingModel::Free,
            PricePlan::Paid { .. } => PricingModel::Paid,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::free()
    }
}

/// Pricing model discriminator as it appears on the wire and in storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    #[default]
    Free,
    Paid,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for PricingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(format!("Invalid pricing model: {}", other)),
        }
    }
}

/// Flat `{model, amount, currency}` document form of [`Pricing`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingDoc {
    #[serde(default)]
    pub model: PricingModel,
    #[serde(default)]
    pub amount: AtomicAmount,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    AMA_SYMBOL.to_string()
}

impl From<PricingDoc> for Pricing {
    fn from(doc: PricingDoc) -> Self {
        let plan = match doc.model {
            PricingModel::Free => PricePlan::Free,
            PricingModel::Paid => PricePlan::Paid { amount: doc.amount },
        };
        Self {
            plan,
            currency: doc.currency.trim().to_ascii_uppercase(),
        }
    }
}

impl From<Pricing> for PricingDoc {
    fn from(pricing: Pricing) -> Self {
        Self {
            model: pricing.model(),
            amount: pricing.amount(),
            currency: pricing.currency,
        }
    }
}

// ============================================================================
// Hosting and media
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostingType {
    #[default]
    SelfHosted,
    PlatformHosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Deploying,
    Running,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Nodejs,
    Python,
    Docker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePlan {
    Basic,
    Pro,
    Enterprise,
}

/// Where the agent runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hosting {
    #[serde(default, rename = "type")]
    pub hosting_type: HostingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Runtime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_plan: Option<ResourcePlan>,
}

/// Optional links shown on the listing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshot_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

/// Aggregate counters maintained by the purchase flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total_purchases: u64,
    pub active_subscribers: u64,
    pub average_rating: f64,
    pub total_reviews: u64,
}

// ============================================================================
// Agent
// ============================================================================

/// A catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub category: AgentCategory,
    pub tags: Vec<String>,
    pub mcp_config: McpConfig,
    pub pricing: Pricing,
    /// Wallet address of the publisher; receives payment on purchase
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Hosting>,
    #[serde(flatten)]
    pub media: AgentMedia,
    pub is_verified: bool,
    pub is_active: bool,
    pub stats: AgentStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub category: AgentCategory,
    pub tags: Vec<String>,
    pub mcp_config: McpConfig,
    pub pricing: Pricing,
    pub owner: String,
    pub hosting: Option<Hosting>,
    pub media: AgentMedia,
}

impl NewAgent {
    /// Materialize a fresh, active, unverified listing with zeroed stats
    pub fn into_agent(self, id: AgentId, now: DateTime<Utc>) -> Agent {
        Agent {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            tags: self.tags,
            mcp_config: self.mcp_config,
            pricing: self.pricing,
            owner: self.owner,
            hosting: self.hosting,
            media: self.media,
            is_verified: false,
            is_active: true,
            stats: AgentStats::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Sort key for listing queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentSort {
    #[default]
    Date,
    Rating,
    Purchases,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Default page size for listing queries
pub const DEFAULT_AGENT_PAGE: u32 = 20;

/// Maximum page size for listing queries
pub const MAX_AGENT_PAGE: u32 = 100;

/// Catalog filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentQuery {
    pub category: Option<AgentCategory>,
    pub owner: Option<String>,
    /// Only verified listings when true; no filter otherwise
    pub verified_only: bool,
    pub is_active: bool,
    pub sort: AgentSort,
    pub order: SortOrder,
    pub limit: u32,
    pub skip: u32,
}

impl Default for AgentQuery {
    fn default() -> Self {
        Self {
            category: None,
            owner: None,
            verified_only: false,
            is_active: true,
            sort: AgentSort::Date,
            order: SortOrder::Desc,
            limit: DEFAULT_AGENT_PAGE,
            skip: 0,
        }
    }
}

impl AgentQuery {
    /// Whether `agent` passes the filter part of this query
    pub fn matches(&self, agent: &Agent) -> bool {
        self.category.map_or(true, |c| agent.category == c)
            && self.owner.as_deref().map_or(true, |o| agent.owner == o)
            && (!self.verified_only || agent.is_verified)
            && agent.is_active == self.is_active
    }
}

/// One page of listings
#[derive(Debug, Clone)]
pub struct AgentPage {
    pub agents: Vec<Agent>,
    pub total: u64,
}
