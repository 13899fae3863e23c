//! Agent catalog DTOs

use agentmart_types::{
    is_plausible_address, Agent, AgentCategory, AgentId, AgentMedia, AgentQuery, AgentSort, AtomicAmount,
    Hosting, McpConfig, McpProtocol, McpTransport, NewAgent, PricePlan, Pricing, PricingModel, SortOrder,
    AMA_SYMBOL, DEFAULT_AGENT_PAGE, MAX_AGENT_PAGE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::dto::Pagination;
use crate::error::ApiError;

// =============================================================================
// Registration
// =============================================================================

/// MCP server connection supplied at registration
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct McpConfigInput {
    /// HTTP(S) URL of the MCP server
    #[serde(default)]
    pub server_url: Option<String>,
    /// `stdio` or `sse` (default)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub protocol: Option<McpProtocol>,
    /// `http` or `websocket`
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub transport: Option<McpTransport>,
}

/// Pricing supplied at registration
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PricingInput {
    /// `free` (default) or `paid`
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub model: Option<PricingModel>,
    /// Price in atomic units
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub amount: Option<Value>,
    /// Currency symbol (default AMA)
    #[serde(default)]
    pub currency: Option<String>,
}

/// Register agent request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgentRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Agent name must be between 3 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 10, max = 1000, message = "Description must be between 10 and 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub mcp_config: Option<McpConfigInput>,
    #[serde(default)]
    pub pricing: Option<PricingInput>,
    /// Wallet address of the publisher
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub hosting: Option<Hosting>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub demo_video_url: Option<String>,
    #[serde(default)]
    pub screenshot_urls: Option<Vec<String>>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RegisterAgentRequest {
    /// The trimmed owner, if one was sent
    pub fn owner(&self) -> Option<&str> {
        present(&self.owner)
    }

    /// Check required fields, apply defaults and build the listing
    pub fn into_new_agent(mut self) -> Result<NewAgent, ApiError> {
        let owner = self
            .owner()
            .ok_or_else(|| ApiError::Unauthorized("Owner wallet address is required".to_string()))?
            .to_string();

        let (name, description, category, server_url) = match (
            present(&self.name),
            present(&self.description),
            present(&self.category),
            self.mcp_config.as_ref().and_then(|m| present(&m.server_url)),
        ) {
            (Some(n), Some(d), Some(c), Some(u)) => (n.to_string(), d.to_string(), c.to_string(), u.to_string()),
            _ => return Err(ApiError::MissingParameter("Missing required fields".to_string())),
        };

        // Length rules apply to the stored, trimmed values
        self.name = Some(name.clone());
        self.description = Some(description.clone());
        self.tags = self.tags.map(|tags| {
            tags.into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        });
        self.validate()?;
        let mcp = self.mcp_config.unwrap_or_default();

        if !is_plausible_address(&owner) {
            return Err(ApiError::ValidationError("Owner must be a wallet address".to_string()));
        }
        let category: AgentCategory = category.parse().map_err(ApiError::ValidationError)?;
        validate_http_url(&server_url)?;

        Ok(NewAgent {
            name,
            description,
            category,
            tags: self.tags.unwrap_or_default(),
            mcp_config: McpConfig {
                server_url,
                protocol: mcp.protocol.unwrap_or_default(),
                transport: mcp.transport,
            },
            pricing: pricing_from_input(self.pricing.unwrap_or_default())?,
            owner,
            hosting: self.hosting,
            media: AgentMedia {
                logo_url: self.logo_url,
                demo_video_url: self.demo_video_url,
                screenshot_urls: self.screenshot_urls.unwrap_or_default(),
                documentation_url: self.documentation_url,
                github_url: self.github_url,
                website_url: self.website_url,
            },
        })
    }
}

/// Maximum tags on a listing
pub const MAX_AGENT_TAGS: usize = 10;

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    let tag_ok = |t: &String| (2..=30).contains(&t.chars().count());
    if tags.len() > MAX_AGENT_TAGS || !tags.iter().all(tag_ok) {
        let mut err = ValidationError::new("tags");
        err.message = Some("Maximum 10 tags allowed, each 2-30 characters".into());
        return Err(err);
    }
    Ok(())
}

fn validate_http_url(url: &str) -> Result<(), ApiError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ApiError::ValidationError("URL must start with http:// or https://".to_string()))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(ApiError::ValidationError("Invalid URL format".to_string()));
    }
    Ok(())
}

fn pricing_from_input(input: PricingInput) -> Result<Pricing, ApiError> {
    let amount = match input.amount {
        None | Some(Value::Null) => AtomicAmount::ZERO,
        value => AtomicAmount::from_json(value.as_ref())
            .map_err(|e| ApiError::ValidationError(format!("Invalid price: {}", e)))?,
    };

    let plan = match input.model.unwrap_or_default() {
        PricingModel::Free => PricePlan::Free,
        PricingModel::Paid if amount.is_zero() => {
            return Err(ApiError::ValidationError("Price must be greater than 0".to_string()));
        }
        PricingModel::Paid => PricePlan::Paid { amount },
    };

    let currency = present(&input.currency)
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| AMA_SYMBOL.to_string());

    Ok(Pricing { plan, currency })
}

/// Summary of a newly registered agent
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    #[schema(value_type = String)]
    pub id: AgentId,
    pub name: String,
    pub owner: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            owner: agent.owner.clone(),
            is_active: agent.is_active,
            is_verified: agent.is_verified,
            created_at: agent.created_at,
        }
    }
}

/// Register agent response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterAgentResponse {
    pub success: bool,
    pub message: String,
    pub data: AgentSummary,
}

// =============================================================================
// Listing
// =============================================================================

/// Catalog query parameters
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAgentsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    /// Only `true` filters
    #[serde(default)]
    pub is_verified: Option<String>,
    /// Anything but `false` lists active agents
    #[serde(default)]
    pub is_active: Option<String>,
    /// `date` (default), `rating` or `purchases`
    #[serde(default)]
    pub sort: Option<String>,
    /// `asc` or `desc` (default)
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<u32>,
    #[serde(default)]
    pub skip: Option<u32>,
}

impl ListAgentsQuery {
    /// Store query, or `None` when the category matches no listing
    pub fn into_query(self) -> Option<AgentQuery> {
        let category = match present(&self.category) {
            Some(c) => Some(c.parse::<AgentCategory>().ok()?),
            None => None,
        };

        let sort = match self.sort.as_deref() {
            Some("rating") => AgentSort::Rating,
            Some("purchases") => AgentSort::Purchases,
            _ => AgentSort::Date,
        };
        let order = match self.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Some(AgentQuery {
            category,
            owner: present(&self.owner).map(str::to_string),
            verified_only: self.is_verified.as_deref() == Some("true"),
            is_active: self.is_active.as_deref() != Some("false"),
            sort,
            order,
            limit: self.limit.unwrap_or(DEFAULT_AGENT_PAGE).min(MAX_AGENT_PAGE),
            skip: self.skip.unwrap_or(0),
        })
    }

    /// Effective page window, as echoed back in the pagination block
    pub fn window(&self) -> (u32, u32) {
        (
            self.limit.unwrap_or(DEFAULT_AGENT_PAGE).min(MAX_AGENT_PAGE),
            self.skip.unwrap_or(0),
        )
    }
}

/// One page of the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Agent>,
    pub pagination: Pagination,
}

/// Single agent
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Agent,
}
