//! Database models for visitors.

use crate::api::models::visitors::VisitorStatus;
use crate::types::{UnitId, UserId, VisitorId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct VisitorCreateDBRequest {
    pub name: String,
    pub document: String,
    pub unit_id: UnitId,
    pub notes: Option<String>,
    pub registered_by: UserId,
}

#[derive(Debug, Clone)]
pub struct VisitorDBResponse {
    pub id: VisitorId,
    pub name: String,
    pub document: String,
    pub unit_id: UnitId,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub status: VisitorStatus,
    pub notes: Option<String>,
    pub registered_by: UserId,
    pub created_at: DateTime<Utc>,
}
