//! API request/response models for package (encomenda) tracking.

use super::pagination::Pagination;
use crate::db::models::packages::PackageDBResponse;
use crate::types::{PackageId, UnitId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Package state, persisted as the `status_encomenda` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "status_encomenda", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    /// Awaiting pickup at the front desk
    Aguardando,
    /// Delivered to the recipient
    Entregue,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageCreate {
    /// The resident this package is addressed to
    #[schema(value_type = String, format = "uuid")]
    pub recipient_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub unit_id: UnitId,
    /// Store or carrier the package came from
    pub store: String,
    pub tracking_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PackageId,
    #[schema(value_type = String, format = "uuid")]
    pub recipient_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub unit_id: UnitId,
    pub store: String,
    pub tracking_code: Option<String>,
    pub received_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub status: PackageStatus,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub registered_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<PackageDBResponse> for PackageResponse {
    fn from(db: PackageDBResponse) -> Self {
        Self {
            id: db.id,
            recipient_id: db.recipient_id,
            unit_id: db.unit_id,
            store: db.store,
            tracking_code: db.tracking_code,
            received_at: db.received_at,
            delivered_at: db.delivered_at,
            status: db.status,
            notes: db.notes,
            registered_by: db.registered_by,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing packages
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListPackagesQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by delivery state
    pub status: Option<PackageStatus>,
}
