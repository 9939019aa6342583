//! Database models for packages.

use crate::api::models::packages::PackageStatus;
use crate::types::{PackageId, UnitId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct PackageCreateDBRequest {
    pub recipient_id: UserId,
    pub unit_id: UnitId,
    pub store: String,
    pub tracking_code: Option<String>,
    pub notes: Option<String>,
    pub registered_by: UserId,
}

#[derive(Debug, Clone)]
pub struct PackageDBResponse {
    pub id: PackageId,
    pub recipient_id: UserId,
    pub unit_id: UnitId,
    pub store: String,
    pub tracking_code: Option<String>,
    pub received_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub status: PackageStatus,
    pub notes: Option<String>,
    pub registered_by: UserId,
    pub created_at: DateTime<Utc>,
}
