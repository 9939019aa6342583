//! Condominium structure endpoints: blocks, units and bookable rooms.
//!
//! The structure section is manager-only, with one exception: `GET /rooms`
//! also serves the reservations section so doormen can see what can be
//! booked. Room mutations stay structure-gated.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        structure::{
            BlockCreate, BlockResponse, ListBlocksQuery, ListRoomsQuery, ListUnitsQuery, RoomCreate, RoomResponse, RoomUpdate, UnitCreate,
            UnitResponse,
        },
        users::CurrentUser,
    },
    auth::permissions::{Section, require_section},
    db::handlers::{
        repository::Repository,
        structure::{BlockFilter, Blocks, RoomFilter, Rooms, UnitFilter, Units},
    },
    db::models::structure::{BlockCreateDBRequest, RoomCreateDBRequest, RoomUpdateDBRequest, UnitCreateDBRequest},
    errors::{Error, Result},
    types::RoomId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

// Blocks

/// Create a block
#[utoipa::path(
    post,
    path = "/blocks",
    request_body = BlockCreate,
    tag = "structure",
    responses(
        (status = 201, description = "Block created", body = BlockResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_block(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<BlockCreate>,
) -> Result<(StatusCode, Json<BlockResponse>)> {
    require_section(&current_user, Section::Structure)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Blocks::new(&mut conn).create(&BlockCreateDBRequest::from(request)).await?;

    Ok((StatusCode::CREATED, Json(BlockResponse::from(created))))
}

/// List blocks
#[utoipa::path(
    get,
    path = "/blocks",
    params(ListBlocksQuery),
    tag = "structure",
    responses(
        (status = 200, description = "Blocks", body = PaginatedResponse<BlockResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_blocks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListBlocksQuery>,
) -> Result<Json<PaginatedResponse<BlockResponse>>> {
    require_section(&current_user, Section::Structure)?;

    let (skip, limit) = query.pagination.params();
    let filter = BlockFilter { skip, limit };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut blocks = Blocks::new(&mut conn);

    let total_count = blocks.count(&filter).await?;
    let data = blocks.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(BlockResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

// Units

/// Create a unit (apartment) inside a block
#[utoipa::path(
    post,
    path = "/units",
    request_body = UnitCreate,
    tag = "structure",
    responses(
        (status = 201, description = "Unit created", body = UnitResponse),
        (status = 400, description = "Unknown block"),
        (status = 409, description = "Unit number already exists in the block"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_unit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UnitCreate>,
) -> Result<(StatusCode, Json<UnitResponse>)> {
    require_section(&current_user, Section::Structure)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Units::new(&mut conn).create(&UnitCreateDBRequest::from(request)).await?;

    Ok((StatusCode::CREATED, Json(UnitResponse::from(created))))
}

/// List units
#[utoipa::path(
    get,
    path = "/units",
    params(ListUnitsQuery),
    tag = "structure",
    responses(
        (status = 200, description = "Units", body = PaginatedResponse<UnitResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_units(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListUnitsQuery>,
) -> Result<Json<PaginatedResponse<UnitResponse>>> {
    require_section(&current_user, Section::Structure)?;

    let (skip, limit) = query.pagination.params();
    let filter = UnitFilter {
        skip,
        limit,
        block_id: query.block_id,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut units = Units::new(&mut conn);

    let total_count = units.count(&filter).await?;
    let data = units.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(UnitResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

// Rooms

/// Create a bookable room
#[utoipa::path(
    post,
    path = "/rooms",
    request_body = RoomCreate,
    tag = "structure",
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RoomCreate>,
) -> Result<(StatusCode, Json<RoomResponse>)> {
    require_section(&current_user, Section::Structure)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Rooms::new(&mut conn).create(&RoomCreateDBRequest::from(request)).await?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(created))))
}

/// List rooms
#[utoipa::path(
    get,
    path = "/rooms",
    params(ListRoomsQuery),
    tag = "structure",
    responses(
        (status = 200, description = "Rooms", body = PaginatedResponse<RoomResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_rooms(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<PaginatedResponse<RoomResponse>>> {
    // Rooms are also needed to place a booking, so either section grants
    // read access
    require_section(&current_user, Section::Structure).or_else(|_| require_section(&current_user, Section::Reservations))?;

    let (skip, limit) = query.pagination.params();
    let filter = RoomFilter {
        skip,
        limit,
        active: query.active,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut rooms = Rooms::new(&mut conn);

    let total_count = rooms.count(&filter).await?;
    let data = rooms.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(RoomResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Update a room; deactivate instead of deleting
#[utoipa::path(
    put,
    path = "/rooms/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = RoomUpdate,
    tag = "structure",
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 404, description = "Room not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<RoomId>,
    Json(request): Json<RoomUpdate>,
) -> Result<Json<RoomResponse>> {
    require_section(&current_user, Section::Structure)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let updated = Rooms::new(&mut conn).update(id, &RoomUpdateDBRequest::from(request)).await?;

    Ok(Json(RoomResponse::from(updated)))
}
