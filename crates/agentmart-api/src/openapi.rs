//! OpenAPI Documentation
//!
//! Generated OpenAPI 3.0 document for the AgentMart API.

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// AgentMart API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgentMart API",
        description = "Marketplace for MCP agents: catalog, purchases settled in AMA, and user registration.",
        version = "1.0.0"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Agents
        handlers::agent::register_agent,
        handlers::agent::list_agents,
        handlers::agent::get_agent,
        // Purchases
        handlers::purchase::record_purchase,
        handlers::purchase::my_agents,
        // Transactions
        handlers::transaction::build_transaction,
        handlers::transaction::submit_transaction,
        // Users
        handlers::user::get_users,
        handlers::user::register_user,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            dto::Pagination,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ComponentStatus,
            // Agents
            dto::McpConfigInput,
            dto::PricingInput,
            dto::RegisterAgentRequest,
            dto::RegisterAgentResponse,
            dto::AgentSummary,
            dto::ListAgentsQuery,
            dto::AgentListResponse,
            dto::AgentResponse,
            // Purchases
            dto::RecordPurchaseRequest,
            dto::RecordPurchaseResponse,
            dto::MyAgentsQuery,
            dto::OwnedAgentEntry,
            dto::MyAgentsResponse,
            // Transactions
            dto::BuildTransactionRequest,
            dto::BuildTransactionResponse,
            dto::SubmitTransactionRequest,
            dto::SubmitTransactionResponse,
            // Users
            dto::UserQuery,
            dto::RegisterUserRequest,
            dto::RegisterUserResponse,
            dto::UserSummary,
            dto::UserResponse,
            dto::UserListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Agents", description = "Agent catalog"),
        (name = "Purchases", description = "Recording purchases and owned agents"),
        (name = "Transactions", description = "Transfer building and node relay"),
        (name = "Users", description = "Wallet user registration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "AgentMart API");
        assert!(spec.paths.paths.contains_key("/api/v1/agents/{id}"));
        assert!(spec.paths.paths.contains_key("/api/v1/transactions/submit"));
    }
}
