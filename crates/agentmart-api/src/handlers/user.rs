//! User Handlers

use agentmart_db::DbError;
use agentmart_types::NewUser;
use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use std::sync::Arc;
use tracing::info;

use crate::dto::{RegisterUserRequest, RegisterUserResponse, UserListResponse, UserQuery, UserResponse, UserSummary};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// Look up a user by public key, or list all users when none is given
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(
        ("publicKey" = Option<String>, Query, description = "Wallet public key")
    ),
    responses(
        (status = 200, description = "User, or all users newest first", body = UserListResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> ApiResult<Response> {
    let public_key = query.public_key.as_deref().map(str::trim).filter(|k| !k.is_empty());

    if let Some(public_key) = public_key {
        let user = state
            .store
            .find_user(public_key)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        return Ok(Json(UserResponse {
            success: true,
            data: user,
        })
        .into_response());
    }

    let users = state.store.list_users().await?;
    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        data: users,
    })
    .into_response())
}

/// Register a wallet as a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterUserResponse),
        (status = 400, description = "Public key missing", body = crate::error::ErrorResponse),
        (status = 409, description = "Public key already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<RegisterUserResponse>)> {
    let new_user = NewUser::normalized(
        request.public_key.as_deref().unwrap_or_default(),
        request.name.as_deref(),
        request.role,
    );
    if new_user.public_key.is_empty() {
        return Err(ApiError::MissingParameter("Public key is required".to_string()));
    }

    let user = match state.store.create_user(new_user).await {
        Ok(user) => user,
        Err(DbError::Duplicate(_)) => {
            return Err(ApiError::Conflict("User with this public key already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            success: true,
            message: "User registered successfully".to_string(),
            data: UserSummary::from(&user),
        }),
    ))
}
