//! User repository

use agentmart_types::{NewUser, User, UserId};
use chrono::Utc;
use sqlx::PgPool;

use crate::error::map_unique_violation;
use crate::models::USER_COLUMNS;
use crate::{DbResult, DbUser};

const USER_PUBLIC_KEY_KEY: &str = "users_public_key_key";

/// Registered wallet users
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new: NewUser) -> DbResult<User> {
        let user = new.into_user(UserId::new(), Utc::now());
        let sql = format!(
            r#"
            INSERT INTO users (id, public_key, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(user.id.as_uuid())
            .bind(&user.public_key)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, USER_PUBLIC_KEY_KEY, || {
                    format!("User {} already exists", user.public_key)
                })
            })?;

        row.try_into()
    }

    /// Find user by public key
    pub async fn find_by_public_key(&self, public_key: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE public_key = $1");
        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(public_key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// List all users, newest first
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, DbUser>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}
