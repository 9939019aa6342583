//! OpenAPI documentation for the portal API.
//!
//! All handlers carry `utoipa::path` annotations; this module stitches them
//! into a single document served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api::models::{
    auth::{AuthResponse, AuthSuccessResponse, ChangePasswordRequest, LoginRequest, SessionResponse},
    communications::{CommunicationCreate, CommunicationKind, CommunicationResponse},
    dashboard::DashboardCounts,
    finance::{FinanceSummary, TransactionCreate, TransactionKind, TransactionResponse},
    packages::{PackageCreate, PackageResponse, PackageStatus},
    pagination::{PaginatedResponse, Pagination},
    reservations::{ReservationCreate, ReservationResponse, ReservationStatus},
    structure::{BlockCreate, BlockResponse, RoomCreate, RoomResponse, RoomUpdate, UnitCreate, UnitResponse},
    users::{ResidentCreate, ResidentResponse, ResidentStatus, ResidentUpdate, Role},
    visitors::{VisitorCreate, VisitorResponse, VisitorStatus},
};

/// Registers the session cookie as a security scheme so protected endpoints
/// render the padlock in the docs UI.
struct SessionSecurityAddon;

impl Modify for SessionSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("condoctl_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "condoctl API",
        description = "Administrative portal for condominium staff: residents, structure, \
                       reservations, gatehouse logs, communications and finance.",
        version = env!("CARGO_PKG_VERSION"),
    ),
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::get_session,
        crate::api::handlers::auth::change_password,
        crate::api::handlers::dashboard::get_dashboard,
        crate::api::handlers::residents::create_resident,
        crate::api::handlers::residents::list_residents,
        crate::api::handlers::residents::get_resident,
        crate::api::handlers::residents::update_resident,
        crate::api::handlers::structure::create_block,
        crate::api::handlers::structure::list_blocks,
        crate::api::handlers::structure::create_unit,
        crate::api::handlers::structure::list_units,
        crate::api::handlers::structure::create_room,
        crate::api::handlers::structure::list_rooms,
        crate::api::handlers::structure::update_room,
        crate::api::handlers::reservations::create_reservation,
        crate::api::handlers::reservations::list_reservations,
        crate::api::handlers::reservations::get_reservation,
        crate::api::handlers::reservations::approve_reservation,
        crate::api::handlers::reservations::decline_reservation,
        crate::api::handlers::reservations::cancel_reservation,
        crate::api::handlers::visitors::create_visitor,
        crate::api::handlers::visitors::list_visitors,
        crate::api::handlers::visitors::get_visitor,
        crate::api::handlers::visitors::checkout_visitor,
        crate::api::handlers::packages::create_package,
        crate::api::handlers::packages::list_packages,
        crate::api::handlers::packages::get_package,
        crate::api::handlers::packages::deliver_package,
        crate::api::handlers::communications::create_communication,
        crate::api::handlers::communications::list_communications,
        crate::api::handlers::communications::get_communication,
        crate::api::handlers::communications::mark_communication_read,
        crate::api::handlers::finance::create_transaction,
        crate::api::handlers::finance::list_transactions,
        crate::api::handlers::finance::get_transaction,
        crate::api::handlers::finance::get_summary,
    ),
    components(schemas(
        LoginRequest,
        AuthResponse,
        AuthSuccessResponse,
        SessionResponse,
        ChangePasswordRequest,
        DashboardCounts,
        ResidentCreate,
        ResidentUpdate,
        ResidentResponse,
        ResidentStatus,
        Role,
        BlockCreate,
        BlockResponse,
        UnitCreate,
        UnitResponse,
        RoomCreate,
        RoomUpdate,
        RoomResponse,
        ReservationCreate,
        ReservationResponse,
        ReservationStatus,
        VisitorCreate,
        VisitorResponse,
        VisitorStatus,
        PackageCreate,
        PackageResponse,
        PackageStatus,
        CommunicationCreate,
        CommunicationResponse,
        CommunicationKind,
        TransactionCreate,
        TransactionResponse,
        TransactionKind,
        FinanceSummary,
        Pagination,
        PaginatedResponse<ResidentResponse>,
        PaginatedResponse<BlockResponse>,
        PaginatedResponse<UnitResponse>,
        PaginatedResponse<RoomResponse>,
        PaginatedResponse<ReservationResponse>,
        PaginatedResponse<VisitorResponse>,
        PaginatedResponse<PackageResponse>,
        PaginatedResponse<CommunicationResponse>,
        PaginatedResponse<TransactionResponse>,
    )),
    modifiers(&SessionSecurityAddon),
    tags(
        (name = "authentication", description = "Session management"),
        (name = "dashboard", description = "Portal landing page counts"),
        (name = "residents", description = "Resident enrollment and management"),
        (name = "structure", description = "Blocks, units and bookable rooms"),
        (name = "reservations", description = "Common-area booking workflow"),
        (name = "visitors", description = "Gatehouse visitor log"),
        (name = "packages", description = "Package intake and delivery"),
        (name = "communications", description = "Messages, notifications and announcements"),
        (name = "finance", description = "Condominium ledger"),
    )
)]
pub struct ApiDoc;
