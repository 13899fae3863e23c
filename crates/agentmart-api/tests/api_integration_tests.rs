//! API Integration Tests
//!
//! Drives the router end to end against the in-memory store and a stub node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agentmart_api::{create_test_router, AppState};
use agentmart_chain::{ChainError, ChainSubmitter};
use agentmart_db::MemoryStore;
use agentmart_types::SubmitReceipt;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const OWNER: &str = "owner-wallet-address-0000000";
const BUYER: &str = "buyer-wallet-address-0000000";

/// Node double that confirms everything, or nothing when unconfigured
#[derive(Default)]
struct StubNode {
    unconfigured: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl ChainSubmitter for StubNode {
    async fn submit(&self, tx_packed: &[u8]) -> Result<SubmitReceipt, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unconfigured {
            return Err(ChainError::NotConfigured);
        }
        Ok(SubmitReceipt {
            tx_hash: format!("0xhash{}", tx_packed.len()),
        })
    }
}

fn router_with(node: StubNode) -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(node));
    create_test_router(Arc::new(state))
}

fn router() -> Router {
    router_with(StubNode::default())
}

/// Test helper to make a request and get JSON response
async fn json_request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let body = if let Some(json_body) = body {
        Body::from(serde_json::to_vec(&json_body).unwrap())
    } else {
        Body::empty()
    };

    let request = request.body(body).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));

    (status, json)
}

fn agent_body(name: &str, pricing: Value) -> Value {
    json!({
        "name": name,
        "description": "Watches wallets for suspicious transfers",
        "category": "analysis",
        "tags": ["security"],
        "mcpConfig": {"serverUrl": "https://sentinel.example/mcp"},
        "pricing": pricing,
        "owner": OWNER,
    })
}

async fn register(router: &Router, name: &str, pricing: Value) -> String {
    let (status, json) = json_request(router, "POST", "/api/v1/agents", Some(agent_body(name, pricing))).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_and_ready() {
        let router = router();
        let (status, json) = json_request(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");

        let (status, json) = json_request(&router, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ready");
        assert_eq!(json["store"]["status"], "healthy");
    }
}

// =============================================================================
// Agents
// =============================================================================

mod agents {
    use super::*;

    #[tokio::test]
    async fn test_register_agent_with_defaults() {
        let router = router();
        let mut body = agent_body("Sentinel", json!(null));
        body.as_object_mut().unwrap().remove("pricing");

        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Agent registered successfully");
        assert_eq!(json["data"]["owner"], OWNER);
        assert_eq!(json["data"]["isActive"], true);
        assert_eq!(json["data"]["isVerified"], false);

        let id = json["data"]["id"].as_str().unwrap();
        let (status, json) = json_request(&router, "GET", &format!("/api/v1/agents/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["pricing"], json!({"model": "free", "amount": 0, "currency": "AMA"}));
        assert_eq!(json["data"]["mcpConfig"]["protocol"], "sse");
    }

    #[tokio::test]
    async fn test_register_agent_failures() {
        let router = router();

        let mut body = agent_body("Sentinel", json!({"model": "free"}));
        body.as_object_mut().unwrap().remove("owner");
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Owner wallet address is required");
        assert_eq!(json["success"], false);

        let mut body = agent_body("Sentinel", json!({"model": "free"}));
        body.as_object_mut().unwrap().remove("description");
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required fields");

        let body = agent_body("Sentinel", json!({"model": "paid", "amount": 0}));
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Price must be greater than 0");

        register(&router, "Sentinel", json!({"model": "free"})).await;
        let body = agent_body("Sentinel", json!({"model": "free"}));
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Agent name already exists for this owner");
    }

    #[tokio::test]
    async fn test_register_agent_field_rules() {
        let router = router();

        let mut body = agent_body("Sentinel", json!({"model": "free"}));
        body["tags"] = json!(vec!["tag"; 11]);
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Maximum 10 tags allowed, each 2-30 characters");

        let mut body = agent_body("Sentinel", json!({"model": "free"}));
        body["tags"] = json!(["x", "y".repeat(40)]);
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Maximum 10 tags allowed, each 2-30 characters");

        let body = agent_body("  ab  ", json!({"model": "free"}));
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Agent name must be between 3 and 100 characters");

        let (_, json) = json_request(&router, "GET", "/api/v1/agents", None).await;
        assert_eq!(json["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_list_agents_pagination() {
        let router = router();
        for i in 0..3 {
            register(&router, &format!("Agent {i}"), json!({"model": "free"})).await;
        }

        let (status, json) = json_request(&router, "GET", "/api/v1/agents?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["pagination"], json!({"total": 3, "limit": 2, "skip": 0, "hasMore": true}));

        let (_, json) = json_request(&router, "GET", "/api/v1/agents?limit=2&skip=2", None).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["pagination"]["hasMore"], false);

        let (_, json) = json_request(&router, "GET", "/api/v1/agents?category=ANALYSIS&limit=500", None).await;
        assert_eq!(json["pagination"]["total"], 3);
        assert_eq!(json["pagination"]["limit"], 100);

        let (_, json) = json_request(&router, "GET", "/api/v1/agents?category=banking", None).await;
        assert_eq!(json["pagination"]["total"], 0);

        let (_, json) = json_request(&router, "GET", "/api/v1/agents?isVerified=true", None).await;
        assert_eq!(json["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_get_agent_errors() {
        let router = router();
        let (status, json) = json_request(&router, "GET", "/api/v1/agents/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid agent ID format");

        let uri = format!("/api/v1/agents/{}", uuid::Uuid::new_v4());
        let (status, json) = json_request(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Agent not found");
    }
}

// =============================================================================
// Purchases
// =============================================================================

mod purchases {
    use super::*;

    fn purchase(agent_id: &str, hash: Option<&str>) -> Value {
        json!({"agentId": agent_id, "buyerAddress": BUYER, "transactionHash": hash})
    }

    #[tokio::test]
    async fn test_free_purchase_and_my_agents() {
        let router = router();
        let id = register(&router, "Scout", json!({"model": "free"})).await;

        let (status, json) = json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&id, None))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Agent successfully added to your collection");
        assert_eq!(json["purchase"]["agentId"], id.as_str());
        assert_eq!(json["purchase"]["purchasePrice"], 0);

        let (status, json) = json_request(&router, "GET", &format!("/api/v1/my-agents?userAddress={BUYER}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["agent"]["name"], "Scout");
        assert_eq!(data[0]["agent"]["stats"]["totalPurchases"], 1);
        assert_eq!(data[0]["agent"]["stats"]["activeSubscribers"], 1);
    }

    #[tokio::test]
    async fn test_purchase_is_idempotent() {
        let router = router();
        let id = register(&router, "Scout", json!({"model": "free"})).await;

        json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&id, None))).await;
        let (status, json) = json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&id, None))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "You already own this agent");

        let (_, json) = json_request(&router, "GET", &format!("/api/v1/agents/{id}"), None).await;
        assert_eq!(json["data"]["stats"]["totalPurchases"], 1);
    }

    #[tokio::test]
    async fn test_paid_purchase_requires_hash() {
        let router = router();
        let id = register(&router, "Oracle", json!({"model": "paid", "amount": 5_000_000_000u64})).await;

        let (status, json) = json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&id, None))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Transaction hash is required for paid agents");

        let (status, json) =
            json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&id, Some("0xconfirmed")))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Purchase successful");
        assert_eq!(json["purchase"]["purchasePrice"], 5_000_000_000u64);
        assert_eq!(json["purchase"]["transactionHash"], "0xconfirmed");
    }

    #[tokio::test]
    async fn test_purchase_validation() {
        let router = router();

        let (status, json) =
            json_request(&router, "POST", "/api/v1/purchases", Some(json!({"agentId": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Agent ID and buyer address are required");

        let (status, json) = json_request(&router, "POST", "/api/v1/purchases", Some(purchase("42", None))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid agent ID format");

        let missing = uuid::Uuid::new_v4().to_string();
        let (status, json) = json_request(&router, "POST", "/api/v1/purchases", Some(purchase(&missing, None))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Agent not found");

        let (status, json) = json_request(&router, "GET", "/api/v1/my-agents", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "User address is required");
    }
}

// =============================================================================
// Transactions
// =============================================================================

mod transactions {
    use super::*;

    #[tokio::test]
    async fn test_build_transaction() {
        let router = router();
        let body = json!({"recipient": OWNER, "amount": 5_000_000_000u64});
        let (status, json) = json_request(&router, "POST", "/api/v1/transactions/build", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["transaction"],
            json!({
                "contract": "Coin",
                "method": "transfer",
                "args": [OWNER, "5000000000", "AMA"],
                "description": "Transfer 5.00 AMA for agent purchase",
            })
        );
    }

    #[tokio::test]
    async fn test_build_transaction_validation() {
        let router = router();
        let (status, json) =
            json_request(&router, "POST", "/api/v1/transactions/build", Some(json!({"recipient": OWNER}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Recipient address and amount are required");

        for amount in [json!(-1), json!(1.5), json!("100")] {
            let body = json!({"recipient": OWNER, "amount": amount});
            let (status, _) = json_request(&router, "POST", "/api/v1/transactions/build", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_submit_transaction() {
        let router = router();
        let body = json!({"txPacked": [1, 2, 3, 4]});
        let (status, json) = json_request(&router, "POST", "/api/v1/transactions/submit", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true, "txHash": "0xhash4"}));

        let body = json!({"txPacked": "3q2+7w=="});
        let (_, json) = json_request(&router, "POST", "/api/v1/transactions/submit", Some(body)).await;
        assert_eq!(json["txHash"], "0xhash4");
    }

    #[tokio::test]
    async fn test_submit_transaction_failures() {
        let router = router();
        let (status, json) = json_request(&router, "POST", "/api/v1/transactions/submit", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Transaction data (txPacked) is required");

        let router = router_with(StubNode {
            unconfigured: true,
            ..Default::default()
        });
        let body = json!({"txPacked": [1, 2, 3]});
        let (status, json) = json_request(&router, "POST", "/api/v1/transactions/submit", Some(body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Node URL not configured");
    }
}

// =============================================================================
// Users
// =============================================================================

mod users {
    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup_user() {
        let router = router();
        let body = json!({"publicKey": "  pk-alice  ", "name": "Alice"});
        let (status, json) = json_request(&router, "POST", "/api/v1/users", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "User registered successfully");
        assert_eq!(json["data"]["publicKey"], "pk-alice");
        assert_eq!(json["data"]["role"], "user");

        let (status, json) = json_request(&router, "GET", "/api/v1/users?publicKey=pk-alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Alice");

        let (status, json) = json_request(&router, "GET", "/api/v1/users?publicKey=pk-bob", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "User not found");
    }

    #[tokio::test]
    async fn test_user_failures_and_listing() {
        let router = router();
        let (status, json) = json_request(&router, "POST", "/api/v1/users", Some(json!({"publicKey": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Public key is required");

        json_request(&router, "POST", "/api/v1/users", Some(json!({"publicKey": "pk-1"}))).await;
        json_request(&router, "POST", "/api/v1/users", Some(json!({"publicKey": "pk-2", "role": "developer"}))).await;
        let (status, json) = json_request(&router, "POST", "/api/v1/users", Some(json!({"publicKey": "pk-1"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "User with this public key already exists");

        let (status, json) = json_request(&router, "GET", "/api/v1/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

mod error_handling {
    use super::*;

    #[tokio::test]
    async fn test_invalid_json_request() {
        let router = router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/users")
            .header("Content-Type", "application/json")
            .body(Body::from("{invalid json}"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found() {
        let router = router();
        let (status, _) = json_request(&router, "GET", "/api/v1/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let router = router();
        let (status, _) = json_request(&router, "DELETE", "/api/v1/agents", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
