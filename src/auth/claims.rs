use serde::{Deserialize, Serialize};

/// User role. Stored and echoed back to clients, but never consulted for a
/// permission decision: any authenticated user may perform any operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// JWT payload asserting an authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,       // user ID
    pub email: String, // user email at issuance
    pub role: Role,    // role at issuance
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
