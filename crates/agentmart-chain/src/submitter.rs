//! Chain submitter
//!
//! Forwards signed, packed transactions to a blockchain node. One network
//! call per submission; nothing is retried.

use std::time::Duration;

use agentmart_types::{Classify, ErrorKind, SubmitReceipt};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Node URL not configured")]
    NotConfigured,

    #[error("Node unreachable: {0}")]
    Unreachable(String),

    #[error("Transaction rejected by node: {0}")]
    Rejected(String),

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),
}

impl Classify for ChainError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalService
    }
}

/// Submits packed transactions and returns the hash the node confirmed
#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    async fn submit(&self, tx_packed: &[u8]) -> Result<SubmitReceipt, ChainError>;
}

/// Configuration for the node client
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_url: Option<String>,
    pub timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_url: std::env::var("AGENTMART_NODE_URL").ok().filter(|u| !u.trim().is_empty()),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the node's transaction endpoint
pub struct NodeClient {
    config: NodeConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct NodeSubmitResponse {
    error: String,
    #[serde(default)]
    hash: Option<String>,
}

impl NodeClient {
    pub fn new(config: NodeConfig) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChainError::Unreachable(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self, ChainError> {
        Self::new(NodeConfig::default())
    }

    pub fn is_configured(&self) -> bool {
        self.config.node_url.is_some()
    }

    fn submit_url(&self) -> Result<String, ChainError> {
        let base = self.config.node_url.as_deref().ok_or(ChainError::NotConfigured)?;
        Ok(format!("{}/api/tx/submit", base.trim_end_matches('/')))
    }
}

#[async_trait]
impl ChainSubmitter for NodeClient {
    async fn submit(&self, tx_packed: &[u8]) -> Result<SubmitReceipt, ChainError> {
        let url = self.submit_url()?;
        debug!(url = %url, bytes = tx_packed.len(), "Submitting transaction to node");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(tx_packed.to_vec())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Node request failed");
                ChainError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Node returned an error status");
            return Err(ChainError::Rejected(format!("HTTP {}", status)));
        }

        let body: NodeSubmitResponse = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        if body.error != "ok" {
            return Err(ChainError::Rejected(body.error));
        }

        let tx_hash = body
            .hash
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ChainError::InvalidResponse("missing transaction hash".into()))?;

        info!(tx_hash = %tx_hash, "Transaction accepted by node");
        Ok(SubmitReceipt { tx_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Bytes, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_node(reply: Value) -> String {
        let app = Router::new().route(
            "/api/tx/submit",
            post(move |body: Bytes| {
                let reply = reply.clone();
                async move {
                    assert_eq!(&body[..], &[1u8, 2, 3][..]);
                    Json(reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(node_url: Option<String>) -> NodeClient {
        NodeClient::new(NodeConfig {
            node_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_confirmed_hash() {
        let url = spawn_node(json!({"error": "ok", "hash": "0xconfirmed"})).await;
        let receipt = client(Some(format!("{}/", url))).submit(&[1, 2, 3]).await.unwrap();
        assert_eq!(receipt.tx_hash, "0xconfirmed");
    }

    #[tokio::test]
    async fn test_node_rejection() {
        let url = spawn_node(json!({"error": "insufficient_funds"})).await;
        let err = client(Some(url)).submit(&[1, 2, 3]).await.unwrap_err();
        assert_eq!(err, ChainError::Rejected("insufficient_funds".into()));
    }

    #[tokio::test]
    async fn test_missing_hash_is_invalid() {
        let url = spawn_node(json!({"error": "ok"})).await;
        let err = client(Some(url)).submit(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let err = client(None).submit(&[1]).await.unwrap_err();
        assert_eq!(err, ChainError::NotConfigured);
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(Some(format!("http://{}", addr))).submit(&[1]).await.unwrap_err();
        assert!(matches!(err, ChainError::Unreachable(_)));
    }
}
