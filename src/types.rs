//! Common type definitions shared across the crate.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: portal user / resident identifier (`usuarios`)
//! - [`BlockId`]: block identifier (`blocos`)
//! - [`UnitId`]: apartment identifier (`apartamentos`)
//! - [`RoomId`]: bookable room identifier (`ambientes`)
//! - [`ReservationId`]: reservation identifier (`reservas`)
//! - [`VisitorId`], [`PackageId`], [`CommunicationId`], [`TransactionId`]:
//!   the remaining per-entity tables

use uuid::Uuid;

pub type UserId = Uuid;
pub type BlockId = Uuid;
pub type UnitId = Uuid;
pub type RoomId = Uuid;
pub type ReservationId = Uuid;
pub type VisitorId = Uuid;
pub type PackageId = Uuid;
pub type CommunicationId = Uuid;
pub type TransactionId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
