use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::{claims::Role, repo::User};

/// Request body for registration. Presence is validated in the handler so the
/// missing-field responses carry the contract's messages.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned by register and login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Response for register (201) and login (200).
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

/// The `/auth/me` account view; unlike the login response it includes the
/// creation timestamp.
#[derive(Debug, Serialize)]
pub struct AccountUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for AccountUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AccountUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_never_contains_the_password_hash() {
        let user = User {
            id: 1,
            name: "QA".into(),
            email: "qa@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            role: Role::User,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn user_row_skips_the_hash_when_serialized() {
        let user = User {
            id: 1,
            name: "QA".into(),
            email: "qa@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            role: Role::Admin,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn account_user_includes_created_at() {
        let user = User {
            id: 3,
            name: "QA".into(),
            email: "qa@example.com".into(),
            password_hash: "h".into(),
            role: Role::User,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&MeResponse {
            user: AccountUser::from(user),
        })
        .unwrap();
        assert!(json.contains("created_at"));
        assert!(json.contains("1970-01-01T00:00:00Z"));
    }
}
