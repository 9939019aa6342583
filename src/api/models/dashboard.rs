//! API response model for the dashboard overview.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Entity counts shown on the portal landing page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardCounts {
    /// Residents with status `ativo`
    pub active_residents: i64,
    /// Reservations awaiting a manager decision
    pub pending_reservations: i64,
    /// Packages awaiting pickup
    pub awaiting_packages: i64,
    /// Visitors currently on the premises
    pub visitors_on_site: i64,
}
