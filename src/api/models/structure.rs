//! API request/response models for the condominium structure: blocks
//! (`blocos`), units (`apartamentos`) and bookable rooms (`ambientes`).

use super::pagination::Pagination;
use crate::db::models::structure::{BlockDBResponse, RoomDBResponse, UnitDBResponse};
use crate::types::{BlockId, RoomId, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Blocks

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BlockId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BlockDBResponse> for BlockResponse {
    fn from(db: BlockDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing blocks
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListBlocksQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

// Units

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitCreate {
    pub number: String,
    #[schema(value_type = String, format = "uuid")]
    pub block_id: BlockId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UnitId,
    pub number: String,
    #[schema(value_type = String, format = "uuid")]
    pub block_id: BlockId,
    pub created_at: DateTime<Utc>,
}

impl From<UnitDBResponse> for UnitResponse {
    fn from(db: UnitDBResponse) -> Self {
        Self {
            id: db.id,
            number: db.number,
            block_id: db.block_id,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing units
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUnitsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by block
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub block_id: Option<BlockId>,
}

// Rooms

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomCreate {
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    /// Rooms referenced by reservations are deactivated, never deleted
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing rooms
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListRoomsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by active flag
    pub active: Option<bool>,
}

impl From<RoomDBResponse> for RoomResponse {
    fn from(db: RoomDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            capacity: db.capacity,
            active: db.active,
            created_at: db.created_at,
        }
    }
}
