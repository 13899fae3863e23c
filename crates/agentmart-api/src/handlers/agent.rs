//! Agent Catalog Handlers
//!
//! Registration, listing and lookup of agent listings.

use agentmart_db::DbError;
use agentmart_types::AgentId;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::{
    AgentListResponse, AgentResponse, AgentSummary, ListAgentsQuery, Pagination, RegisterAgentRequest,
    RegisterAgentResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedQuery;
use crate::state::AppState;

/// Register a new agent
#[utoipa::path(
    post,
    path = "/api/v1/agents",
    tag = "Agents",
    request_body = RegisterAgentRequest,
    responses(
        (status = 201, description = "Agent registered", body = RegisterAgentResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorResponse),
        (status = 401, description = "Owner missing", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used by this owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterAgentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterAgentResponse>)> {
    // Validated after the owner and required-field checks
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let new_agent = request.into_new_agent()?;

    let agent = match state.store.create_agent(new_agent).await {
        Ok(agent) => agent,
        Err(DbError::Duplicate(_)) => {
            return Err(ApiError::Conflict("Agent name already exists for this owner".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        agent_id = %agent.id,
        owner = %agent.owner,
        model = agent.pricing.model().as_str(),
        "Agent registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterAgentResponse {
            success: true,
            message: "Agent registered successfully".to_string(),
            data: AgentSummary::from(&agent),
        }),
    ))
}

/// List agents with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/agents",
    tag = "Agents",
    params(
        ("category" = Option<String>, Query, description = "Category (case-insensitive)"),
        ("owner" = Option<String>, Query, description = "Owner wallet address"),
        ("isVerified" = Option<String>, Query, description = "`true` lists verified agents only"),
        ("isActive" = Option<String>, Query, description = "`false` lists inactive agents"),
        ("sort" = Option<String>, Query, description = "date, rating or purchases"),
        ("order" = Option<String>, Query, description = "asc or desc"),
        ("limit" = Option<u32>, Query, description = "Page size (default 20, max 100)"),
        ("skip" = Option<u32>, Query, description = "Items to skip")
    ),
    responses(
        (status = 200, description = "Agents", body = AgentListResponse)
    )
)]
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<ListAgentsQuery>,
) -> ApiResult<Json<AgentListResponse>> {
    let (limit, skip) = params.window();

    let (agents, total) = match params.into_query() {
        Some(query) => {
            let page = state.store.list_agents(&query).await?;
            (page.agents, page.total)
        }
        None => (Vec::new(), 0),
    };

    Ok(Json(AgentListResponse {
        success: true,
        data: agents,
        pagination: Pagination::new(total, limit, skip),
    }))
}

/// Get an agent by id
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}",
    tag = "Agents",
    params(
        ("id" = String, Path, description = "Agent ID")
    ),
    responses(
        (status = 200, description = "Agent", body = AgentResponse),
        (status = 400, description = "Invalid agent ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentResponse>> {
    let id = parse_agent_id(&id)?;

    let agent = state
        .store
        .find_agent(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Agent not found".to_string()))?;

    Ok(Json(AgentResponse {
        success: true,
        data: agent,
    }))
}

pub(crate) fn parse_agent_id(raw: &str) -> ApiResult<AgentId> {
    AgentId::parse(raw.trim()).map_err(|_| ApiError::InvalidParameter("Invalid agent ID format".to_string()))
}
