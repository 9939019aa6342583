//! Database models for residents / portal users.

use crate::api::models::users::{ResidentStatus, ResidentUpdate, Role};
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<ResidentStatus>,
    pub password_hash: Option<String>,
}

impl From<ResidentUpdate> for UserUpdateDBRequest {
    fn from(update: ResidentUpdate) -> Self {
        Self {
            name: update.name,
            phone: update.phone,
            role: update.role,
            status: update.status,
            password_hash: None, // Regular updates don't include password changes
        }
    }
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub status: ResidentStatus,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
