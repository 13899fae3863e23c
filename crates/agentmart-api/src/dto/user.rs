//! User DTOs

use agentmart_types::{User, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User lookup query
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Register user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[serde(default)]
    #[validate(length(max = 256, message = "Public key is too long"))]
    pub public_key: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must not exceed 100 characters"))]
    pub name: Option<String>,
    /// `user` (default), `developer` or `admin`
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub role: Option<UserRole>,
}

/// Summary of a newly registered user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[schema(value_type = String)]
    pub id: UserId,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[schema(value_type = String)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            public_key: user.public_key.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Register user response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterUserResponse {
    pub success: bool,
    pub message: String,
    pub data: UserSummary,
}

/// Single user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: User,
}

/// All users, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<User>,
}
