//! Transaction Handlers
//!
//! Builds transfer descriptors for the wallet to sign and relays signed
//! transactions to the node.

use agentmart_chain::build_transfer_from_json;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::dto::{
    BuildTransactionRequest, BuildTransactionResponse, SubmitTransactionRequest, SubmitTransactionResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build an unsigned `Coin.transfer`
#[utoipa::path(
    post,
    path = "/api/v1/transactions/build",
    tag = "Transactions",
    request_body = BuildTransactionRequest,
    responses(
        (status = 200, description = "Transaction descriptor", body = BuildTransactionResponse),
        (status = 400, description = "Missing or invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn build_transaction(
    payload: Result<Json<BuildTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<BuildTransactionResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if !request.is_complete() {
        return Err(ApiError::MissingParameter(
            "Recipient address and amount are required".to_string(),
        ));
    }

    let transaction = build_transfer_from_json(request.recipient.as_ref(), request.amount.as_ref())?;

    Ok(Json(BuildTransactionResponse {
        success: true,
        transaction,
    }))
}

/// Relay a signed transaction to the node
#[utoipa::path(
    post,
    path = "/api/v1/transactions/submit",
    tag = "Transactions",
    request_body = SubmitTransactionRequest,
    responses(
        (status = 200, description = "Submitted", body = SubmitTransactionResponse),
        (status = 400, description = "Transaction data missing", body = crate::error::ErrorResponse),
        (status = 500, description = "Node unreachable or not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitTransactionResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let tx_packed = request
        .tx_packed
        .ok_or_else(|| ApiError::MissingParameter("Transaction data (txPacked) is required".to_string()))?
        .into_bytes()?;

    let receipt = state.submitter.submit(&tx_packed).await?;
    info!(tx_hash = %receipt.tx_hash, bytes = tx_packed.len(), "Transaction relayed");

    Ok(Json(SubmitTransactionResponse {
        success: true,
        tx_hash: receipt.tx_hash,
    }))
}
