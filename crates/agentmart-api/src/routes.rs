//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route(
            "/agents",
            get(handlers::agent::list_agents).post(handlers::agent::register_agent),
        )
        .route("/agents/:id", get(handlers::agent::get_agent))
        // Purchases
        .route("/purchases", post(handlers::purchase::record_purchase))
        .route("/my-agents", get(handlers::purchase::my_agents))
        // Chain relay
        .nest("/transactions", transaction_routes())
        // Users
        .route(
            "/users",
            get(handlers::user::get_users).post(handlers::user::register_user),
        )
}

/// Transaction build/submit routes
fn transaction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/build", post(handlers::transaction::build_transaction))
        .route("/submit", post(handlers::transaction::submit_transaction))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
