//! API request/response models for room reservations.

use super::pagination::Pagination;
use crate::db::models::reservations::ReservationDBResponse;
use crate::types::{ReservationId, RoomId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Reservation workflow state, persisted as the `status_reserva` enum.
///
/// `aprovada`, `recusada` and `cancelada` are terminal; no transition
/// reopens them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "status_reserva", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pendente,
    Aprovada,
    Recusada,
    Cancelada,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Pendente)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationCreate {
    #[schema(value_type = String, format = "uuid")]
    pub room_id: RoomId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
    /// Book on behalf of this resident; defaults to the authenticated user
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReservationId,
    #[schema(value_type = String, format = "uuid")]
    pub room_id: RoomId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationDBResponse> for ReservationResponse {
    fn from(db: ReservationDBResponse) -> Self {
        Self {
            id: db.id,
            room_id: db.room_id,
            user_id: db.user_id,
            starts_at: db.starts_at,
            ends_at: db.ends_at,
            status: db.status,
            notes: db.notes,
            created_by: db.created_by,
            processed_by: db.processed_by,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing reservations
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListReservationsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by workflow state
    pub status: Option<ReservationStatus>,

    /// Filter by room
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_id: Option<RoomId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&ReservationStatus::Pendente).unwrap(), "\"pendente\"");
        assert_eq!(serde_json::to_string(&ReservationStatus::Aprovada).unwrap(), "\"aprovada\"");
        assert_eq!(serde_json::to_string(&ReservationStatus::Recusada).unwrap(), "\"recusada\"");
        assert_eq!(serde_json::to_string(&ReservationStatus::Cancelada).unwrap(), "\"cancelada\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ReservationStatus::Pendente.is_terminal());
        assert!(ReservationStatus::Aprovada.is_terminal());
        assert!(ReservationStatus::Recusada.is_terminal());
        assert!(ReservationStatus::Cancelada.is_terminal());
    }
}
