//! Registered wallet users

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Developer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Developer => "developer",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "developer" => Ok(Self::Developer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// A wallet that registered with the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub public_key: String,
    pub name: Option<String>,
    pub role: UserRole,
}

impl NewUser {
    /// Trims the key and name, dropping a name that is blank after trimming
    pub fn normalized(public_key: &str, name: Option<&str>, role: Option<UserRole>) -> Self {
        Self {
            public_key: public_key.trim().to_string(),
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            role: role.unwrap_or_default(),
        }
    }

    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            public_key: self.public_key,
            name: self.name,
            role: self.role,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims() {
        let user = NewUser::normalized("  pk-123  ", Some("  "), None);
        assert_eq!(user.public_key, "pk-123");
        assert_eq!(user.name, None);
        assert_eq!(user.role, UserRole::User);
    }
}
