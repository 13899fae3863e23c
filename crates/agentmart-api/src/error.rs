//! API error handling
//!
//! Every failure is rendered as `{success: false, code, error}`; purchase
//! failures that happened after funds moved also carry the transaction hash.

use agentmart_chain::{BuildError, ChainError};
use agentmart_db::DbError;
use agentmart_purchase::{PreconditionFailure, PurchaseError};
use agentmart_types::{Classify, ErrorKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors (1000-1099)
    // =========================================================================
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Request body too large. Maximum size is {0} bytes")]
    RequestTooLarge(usize),

    #[error("{0}")]
    Unauthorized(String),

    // =========================================================================
    // Catalog Errors (2000-2099)
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // =========================================================================
    // Purchase Errors (3000-3099)
    // =========================================================================
    #[error("Agent is not available for purchase")]
    AgentUnavailable,

    #[error("You already own this agent")]
    AlreadyOwned { transaction_hash: Option<String> },

    #[error("Transaction hash is required for paid agents")]
    PaymentRequired,

    // =========================================================================
    // Chain Errors (4000-4099)
    // =========================================================================
    #[error("Node URL not configured")]
    NodeNotConfigured,

    #[error("{0}")]
    ExternalService(String),

    // =========================================================================
    // Internal Errors (5000-5099)
    // =========================================================================
    #[error("{message}")]
    DatabaseError {
        message: String,
        transaction_hash: Option<String>,
    },
}

impl ApiError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
            transaction_hash: None,
        }
    }

    /// Numeric error code
    pub fn error_code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => 1000,
            Self::MissingParameter(_) => 1001,
            Self::InvalidParameter(_) => 1002,
            Self::ValidationError(_) => 1003,
            Self::InvalidRequestBody => 1004,
            Self::RequestTooLarge(_) => 1005,
            Self::Unauthorized(_) => 1010,

            Self::NotFound(_) => 2001,
            Self::Conflict(_) => 2002,

            Self::AgentUnavailable => 3001,
            Self::AlreadyOwned { .. } => 3002,
            Self::PaymentRequired => 3003,

            Self::NodeNotConfigured => 4001,
            Self::ExternalService(_) => 4002,

            Self::DatabaseError { .. } => 5001,
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::MissingParameter(_)
            | Self::InvalidParameter(_)
            | Self::ValidationError(_)
            | Self::InvalidRequestBody
            | Self::AgentUnavailable
            | Self::AlreadyOwned { .. }
            | Self::PaymentRequired => StatusCode::BAD_REQUEST,

            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            Self::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::NodeNotConfigured
            | Self::ExternalService(_)
            | Self::DatabaseError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Confirmed transfer hash to surface for reconciliation
    pub fn transaction_hash(&self) -> Option<&str> {
        match self {
            Self::AlreadyOwned { transaction_hash } | Self::DatabaseError { transaction_hash, .. } => {
                transaction_hash.as_deref()
            }
            _ => None,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub error: String,
    /// Hash of a transfer that was confirmed before the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            success: false,
            code: err.error_code(),
            error: err.to_string(),
            transaction_hash: err.transaction_hash().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = ?err, kind = %err.kind(), "Database error");
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::Conflict => Self::Conflict(err.to_string()),
            ErrorKind::Validation => Self::ValidationError(err.to_string()),
            _ => Self::database("Database error"),
        }
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::MissingRecipient => Self::MissingParameter(err.to_string()),
            BuildError::InvalidAmount(_) => Self::InvalidParameter(err.to_string()),
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::NotConfigured => Self::NodeNotConfigured,
            other => Self::ExternalService(other.to_string()),
        }
    }
}

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::PreconditionFailed(failure) => match failure {
                PreconditionFailure::AgentNotFound(_) => Self::NotFound("Agent not found".to_string()),
                PreconditionFailure::AgentInactive(_) => Self::AgentUnavailable,
                PreconditionFailure::PaymentRequired => Self::PaymentRequired,
                other => Self::BadRequest(other.to_string()),
            },
            PurchaseError::AlreadyOwned { transaction_hash } => Self::AlreadyOwned { transaction_hash },
            PurchaseError::TransactionBuildFailed(e) => e.into(),
            PurchaseError::TransactionFailed(e) => Self::ExternalService(e.to_string()),
            PurchaseError::RecordingFailed {
                source,
                transaction_hash,
            } => {
                tracing::error!(error = %source, tx_hash = ?transaction_hash, "Purchase could not be recorded");
                Self::DatabaseError {
                    message: "Failed to record purchase".to_string(),
                    transaction_hash,
                }
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidRequestBody
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(crate::extractors::format_validation_errors(&err))
    }
}
