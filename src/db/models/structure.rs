//! Database models for blocks, units and rooms.

use crate::api::models::structure::{BlockCreate, RoomCreate, RoomUpdate, UnitCreate};
use crate::types::{BlockId, RoomId, UnitId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct BlockCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
}

impl From<BlockCreate> for BlockCreateDBRequest {
    fn from(api: BlockCreate) -> Self {
        Self {
            name: api.name,
            description: api.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlockDBResponse {
    pub id: BlockId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UnitCreateDBRequest {
    pub number: String,
    pub block_id: BlockId,
}

impl From<UnitCreate> for UnitCreateDBRequest {
    fn from(api: UnitCreate) -> Self {
        Self {
            number: api.number,
            block_id: api.block_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitDBResponse {
    pub id: UnitId,
    pub number: String,
    pub block_id: BlockId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RoomCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

impl From<RoomCreate> for RoomCreateDBRequest {
    fn from(api: RoomCreate) -> Self {
        Self {
            name: api.name,
            description: api.description,
            capacity: api.capacity,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub active: Option<bool>,
}

impl From<RoomUpdate> for RoomUpdateDBRequest {
    fn from(api: RoomUpdate) -> Self {
        Self {
            name: api.name,
            description: api.description,
            capacity: api.capacity,
            active: api.active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomDBResponse {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
