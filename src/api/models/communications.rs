//! API request/response models for communications.

use super::pagination::Pagination;
use crate::db::models::communications::CommunicationDBResponse;
use crate::types::{BlockId, CommunicationId, UnitId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Communication kind, persisted as the `tipo_comunicacao` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tipo_comunicacao", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommunicationKind {
    /// Direct message
    Mensagem,
    /// Notification (e.g. package arrival)
    Notificacao,
    /// Broadcast announcement
    Comunicado,
}

/// Who a communication is addressed to.
///
/// At most one of the three targets may be set; all absent means the
/// whole condominium.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CommunicationTarget {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub recipient_id: Option<UserId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub unit_id: Option<UnitId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub block_id: Option<BlockId>,
}

impl CommunicationTarget {
    /// Number of targets set; more than one is a validation error.
    pub fn count(&self) -> usize {
        [
            self.recipient_id.is_some(),
            self.unit_id.is_some(),
            self.block_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommunicationCreate {
    pub title: String,
    pub content: String,
    pub kind: CommunicationKind,
    #[serde(flatten)]
    #[schema(inline)]
    pub target: CommunicationTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommunicationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CommunicationId,
    pub title: String,
    pub content: String,
    pub kind: CommunicationKind,
    #[schema(value_type = String, format = "uuid")]
    pub sender_id: UserId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub recipient_id: Option<UserId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub unit_id: Option<UnitId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub block_id: Option<BlockId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CommunicationDBResponse> for CommunicationResponse {
    fn from(db: CommunicationDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            content: db.content,
            kind: db.kind,
            sender_id: db.sender_id,
            recipient_id: db.recipient_id,
            unit_id: db.unit_id,
            block_id: db.block_id,
            read: db.read,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing communications
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListCommunicationsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by kind
    pub kind: Option<CommunicationKind>,

    /// Only return communications that have not been read yet
    pub unread_only: Option<bool>,
}
