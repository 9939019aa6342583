//! Database models for reservations.

use crate::api::models::reservations::ReservationStatus;
use crate::types::{ReservationId, RoomId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a reservation.
///
/// The initial status and `processed_by` are decided by the caller from the
/// creator's role: a manager-created reservation starts `aprovada` with
/// `processed_by` set to the creator, anything else starts `pendente`.
#[derive(Debug, Clone)]
pub struct ReservationCreateDBRequest {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub processed_by: Option<UserId>,
}

/// Database response for a reservation
#[derive(Debug, Clone)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
