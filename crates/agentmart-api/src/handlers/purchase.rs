//! Purchase Handlers
//!
//! Recording confirmed purchases and listing what a wallet owns.

use agentmart_purchase::RecordPurchase;
use agentmart_types::PurchaseSummary;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{MyAgentsQuery, MyAgentsResponse, OwnedAgentEntry, RecordPurchaseRequest, RecordPurchaseResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ValidatedJson, ValidatedQuery};
use crate::handlers::agent::parse_agent_id;
use crate::state::AppState;

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Record a purchase
///
/// Called by the client once the transfer for a paid agent has been
/// confirmed; free agents need no hash.
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    tag = "Purchases",
    request_body = RecordPurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded", body = RecordPurchaseResponse),
        (status = 400, description = "Missing fields, inactive agent or already owned", body = crate::error::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Purchase could not be recorded", body = crate::error::ErrorResponse)
    )
)]
pub async fn record_purchase(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RecordPurchaseRequest>,
) -> ApiResult<(StatusCode, Json<RecordPurchaseResponse>)> {
    let (agent_id, buyer_address) = match (present(request.agent_id), present(request.buyer_address)) {
        (Some(agent_id), Some(buyer)) => (agent_id, buyer),
        _ => {
            return Err(ApiError::MissingParameter(
                "Agent ID and buyer address are required".to_string(),
            ))
        }
    };
    let agent_id = parse_agent_id(&agent_id)?;

    let recorded = state
        .recorder
        .record(RecordPurchase {
            agent_id,
            buyer_address,
            transaction_hash: request.transaction_hash,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordPurchaseResponse {
            success: true,
            purchase: PurchaseSummary::from(&recorded.record),
            message: recorded.message().to_string(),
        }),
    ))
}

/// List the agents a wallet owns, newest purchase first
#[utoipa::path(
    get,
    path = "/api/v1/my-agents",
    tag = "Purchases",
    params(
        ("userAddress" = String, Query, description = "Buyer wallet address")
    ),
    responses(
        (status = 200, description = "Owned agents", body = MyAgentsResponse),
        (status = 400, description = "Address missing", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_agents(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<MyAgentsQuery>,
) -> ApiResult<Json<MyAgentsResponse>> {
    let address = present(query.user_address)
        .ok_or_else(|| ApiError::MissingParameter("User address is required".to_string()))?;

    let owned = state.store.list_owned_agents(&address).await?;

    Ok(Json(MyAgentsResponse {
        success: true,
        data: owned.into_iter().map(OwnedAgentEntry::from).collect(),
    }))
}
