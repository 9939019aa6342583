//! API request/response models for residents and portal users.

use super::pagination::Pagination;
use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Portal role, persisted as the `user_tipo` enum.
///
/// Wire values are kept identical to the hosted store this portal replaces
/// (`sindico`, `porteiro`, `morador`) so existing rows decode unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_tipo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Condominium manager (síndico) - full portal access
    Sindico,
    /// Doorman (porteiro) - operational sections only
    Porteiro,
    /// Resident (morador) - exists in the data model but has no portal login
    Morador,
}

impl Role {
    /// Whether this role is allowed to authenticate against the portal at all.
    pub fn has_portal_access(&self) -> bool {
        matches!(self, Role::Sindico | Role::Porteiro)
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Sindico)
    }
}

/// Resident account status, persisted as the `status_morador` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "status_morador", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResidentStatus {
    Ativo,
    Inativo,
}

// Resident request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResidentCreate {
    pub name: String,
    pub email: String,
    /// Initial password; hashed with Argon2id before storage
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResidentUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    /// Deactivate/reactivate instead of deleting
    pub status: Option<ResidentStatus>,
}

// Resident response model (password hash never leaves the db layer)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResidentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub status: ResidentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for ResidentResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            role: db.role,
            phone: db.phone,
            status: db.status,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing residents
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListResidentsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by account status
    pub status: Option<ResidentStatus>,

    /// Case-insensitive substring match on name or email
    pub search: Option<String>,
}

/// The authenticated identity extracted from the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            role: db.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_string(&Role::Sindico).unwrap(), "\"sindico\"");
        assert_eq!(serde_json::to_string(&Role::Porteiro).unwrap(), "\"porteiro\"");
        assert_eq!(serde_json::to_string(&Role::Morador).unwrap(), "\"morador\"");
    }

    #[test]
    fn test_portal_access() {
        assert!(Role::Sindico.has_portal_access());
        assert!(Role::Porteiro.has_portal_access());
        assert!(!Role::Morador.has_portal_access());
        assert!(Role::Sindico.is_manager());
        assert!(!Role::Porteiro.is_manager());
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&ResidentStatus::Ativo).unwrap(), "\"ativo\"");
        assert_eq!(serde_json::to_string(&ResidentStatus::Inativo).unwrap(), "\"inativo\"");
    }
}
