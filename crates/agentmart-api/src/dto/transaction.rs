//! Transaction build and relay DTOs

use agentmart_types::UnsignedTransaction;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Build transaction request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BuildTransactionRequest {
    /// Recipient wallet address
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub recipient: Option<Value>,
    /// Amount in atomic units
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub amount: Option<Value>,
}

impl BuildTransactionRequest {
    pub fn is_complete(&self) -> bool {
        let recipient = match &self.recipient {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        recipient && !matches!(self.amount, None | Some(Value::Null))
    }
}

/// Build transaction response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuildTransactionResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub transaction: UnsignedTransaction,
}

/// Packed transaction as sent by the wallet: base64 text or raw bytes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TxPacked {
    Bytes(Vec<u8>),
    Encoded(String),
}

impl TxPacked {
    pub fn into_bytes(self) -> Result<Vec<u8>, ApiError> {
        let bytes = match self {
            Self::Bytes(bytes) => bytes,
            Self::Encoded(text) => base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|_| ApiError::InvalidParameter("txPacked must be base64 or a byte array".to_string()))?,
        };
        if bytes.is_empty() {
            return Err(ApiError::MissingParameter("Transaction data (txPacked) is required".to_string()));
        }
        Ok(bytes)
    }
}

/// Submit transaction request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub tx_packed: Option<TxPacked>,
}

/// Submit transaction response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionResponse {
    pub success: bool,
    pub tx_hash: String,
}
