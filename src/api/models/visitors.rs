//! API request/response models for visitor registration.

use super::pagination::Pagination;
use crate::db::models::visitors::VisitorDBResponse;
use crate::types::{UnitId, UserId, VisitorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Visitor state, persisted as the `status_visitante` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "status_visitante", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    /// Currently on the premises
    Ativo,
    /// Checked out
    Saiu,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorCreate {
    pub name: String,
    /// Identity document presented at the gate
    pub document: String,
    #[schema(value_type = String, format = "uuid")]
    pub unit_id: UnitId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VisitorId,
    pub name: String,
    pub document: String,
    #[schema(value_type = String, format = "uuid")]
    pub unit_id: UnitId,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub status: VisitorStatus,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub registered_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<VisitorDBResponse> for VisitorResponse {
    fn from(db: VisitorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            document: db.document,
            unit_id: db.unit_id,
            entered_at: db.entered_at,
            left_at: db.left_at,
            status: db.status,
            notes: db.notes,
            registered_by: db.registered_by,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing visitors
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListVisitorsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by state (on-site vs checked out)
    pub status: Option<VisitorStatus>,
}
