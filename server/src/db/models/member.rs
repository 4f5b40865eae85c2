//! Member Model
//!
//! Buyer and admin accounts. Soft-deleted via `is_active`, never removed,
//! because orders keep referencing their owner.

use serde::{Deserialize, Serialize};
use shared::Role;
use surrealdb::RecordId;
use validator::Validate;

pub type MemberId = RecordId;

/// Member model (includes the password hash; never serialized to clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<MemberId>,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Member {
    /// Client-safe view
    pub fn into_response(self) -> MemberResponse {
        MemberResponse {
            id: self.id.map(|id| id.to_string()),
            username: self.username,
            name: self.name,
            email: self.email,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Member view returned by the API (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: Option<String>,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MemberCreate {
    #[validate(length(min = 3, max = 40))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}
