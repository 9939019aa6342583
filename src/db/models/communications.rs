//! Database models for communications.

use crate::api::models::communications::CommunicationKind;
use crate::types::{BlockId, CommunicationId, UnitId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CommunicationCreateDBRequest {
    pub title: String,
    pub content: String,
    pub kind: CommunicationKind,
    pub sender_id: UserId,
    pub recipient_id: Option<UserId>,
    pub unit_id: Option<UnitId>,
    pub block_id: Option<BlockId>,
}

#[derive(Debug, Clone)]
pub struct CommunicationDBResponse {
    pub id: CommunicationId,
    pub title: String,
    pub content: String,
    pub kind: CommunicationKind,
    pub sender_id: UserId,
    pub recipient_id: Option<UserId>,
    pub unit_id: Option<UnitId>,
    pub block_id: Option<BlockId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
