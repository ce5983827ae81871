//! Authentication Models
//!
//! Data structures for authenticated identity extracted from JWT claims.

use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;

/// Authenticated user information extracted from a validated JWT.
///
/// Inserted into request extensions by the auth middleware and read back by
/// protected handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            name: claims.name,
            email: claims.email,
        }
    }
}
