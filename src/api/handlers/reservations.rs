//! Reservation endpoints and the booking workflow.
//!
//! Lifecycle: `pendente` -> `aprovada` / `recusada` / `cancelada`. The three
//! target states are terminal. Every transition runs in one transaction with
//! the target row locked, and the overlap rule for approved bookings is
//! checked inside that same transaction so first approval wins.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        reservations::{ListReservationsQuery, ReservationCreate, ReservationResponse, ReservationStatus},
        users::CurrentUser,
    },
    auth::permissions::{Section, require_manager, require_section},
    db::{
        handlers::{
            repository::Repository,
            reservations::{ReservationFilter, Reservations},
            structure::Rooms,
        },
        models::reservations::{ReservationCreateDBRequest, ReservationDBResponse},
    },
    errors::{Error, Result},
    types::ReservationId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn reservation_not_found(id: ReservationId) -> Error {
    Error::NotFound {
        resource: "Reservation".to_string(),
        id: id.to_string(),
    }
}

fn booking_conflict() -> Error {
    Error::Conflict {
        message: "The room is already booked for this period".to_string(),
    }
}

/// Create a reservation
///
/// A manager's booking is approved on the spot (the overlap rule applies
/// immediately); any other creator starts at `pendente`.
#[utoipa::path(
    post,
    path = "/reservations",
    request_body = ReservationCreate,
    tag = "reservations",
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Invalid period or unknown room"),
        (status = 409, description = "Overlaps an approved reservation"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ReservationCreate>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    require_section(&current_user, Section::Reservations)?;

    if request.starts_at >= request.ends_at {
        return Err(Error::BadRequest {
            message: "Reservation must start before it ends".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut rooms = Rooms::new(&mut tx);
        // A manager's booking is approved in this transaction, so take the
        // room lock before the overlap count
        let room = if current_user.role.is_manager() {
            rooms.get_for_update(request.room_id).await?
        } else {
            rooms.get_by_id(request.room_id).await?
        }
        .ok_or_else(|| Error::NotFound {
            resource: "Room".to_string(),
            id: request.room_id.to_string(),
        })?;
        if !room.active {
            return Err(Error::BadRequest {
                message: "Room is not available for booking".to_string(),
            });
        }
    }

    let created = {
        let mut reservations = Reservations::new(&mut tx);

        let (status, processed_by) = if current_user.role.is_manager() {
            let overlapping = reservations
                .overlapping_approved(request.room_id, request.starts_at, request.ends_at, None)
                .await?;
            if overlapping > 0 {
                return Err(booking_conflict());
            }
            (ReservationStatus::Aprovada, Some(current_user.id))
        } else {
            (ReservationStatus::Pendente, None)
        };

        reservations
            .create(&ReservationCreateDBRequest {
                room_id: request.room_id,
                user_id: request.user_id.unwrap_or(current_user.id),
                starts_at: request.starts_at,
                ends_at: request.ends_at,
                status,
                notes: request.notes,
                created_by: current_user.id,
                processed_by,
            })
            .await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(ReservationResponse::from(created))))
}

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    params(ListReservationsQuery),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservations", body = PaginatedResponse<ReservationResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_reservations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<PaginatedResponse<ReservationResponse>>> {
    require_section(&current_user, Section::Reservations)?;

    let (skip, limit) = query.pagination.params();
    let filter = ReservationFilter {
        skip,
        limit,
        status: query.status,
        room_id: query.room_id,
        user_id: None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut reservations = Reservations::new(&mut conn);

    let total_count = reservations.count(&filter).await?;
    let data = reservations.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(ReservationResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a reservation by ID
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ReservationResponse>> {
    require_section(&current_user, Section::Reservations)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let reservation = Reservations::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| reservation_not_found(id))?;

    Ok(Json(ReservationResponse::from(reservation)))
}

/// Lock the reservation row and require it to still be pending.
async fn pending_for_update(reservations: &mut Reservations<'_>, id: ReservationId) -> Result<ReservationDBResponse> {
    let reservation = reservations.get_for_update(id).await?.ok_or_else(|| reservation_not_found(id))?;
    if reservation.status != ReservationStatus::Pendente {
        return Err(Error::Conflict {
            message: "Reservation has already been processed".to_string(),
        });
    }
    Ok(reservation)
}

/// Approve a pending reservation (manager only)
#[utoipa::path(
    post,
    path = "/reservations/{id}/approve",
    params(("id" = String, Path, format = "uuid")),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation approved", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Not pending, or overlaps an approved reservation"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn approve_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ReservationResponse>> {
    require_manager(&current_user, Section::Reservations)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let reservation = {
        let mut reservations = Reservations::new(&mut tx);
        pending_for_update(&mut reservations, id).await?
    };

    // Lock the room so concurrent approvals for it serialize; without this,
    // two overlapping pending reservations could both pass the overlap count
    {
        let mut rooms = Rooms::new(&mut tx);
        rooms.get_for_update(reservation.room_id).await?;
    }

    let updated = {
        let mut reservations = Reservations::new(&mut tx);

        let overlapping = reservations
            .overlapping_approved(reservation.room_id, reservation.starts_at, reservation.ends_at, Some(id))
            .await?;
        if overlapping > 0 {
            return Err(booking_conflict());
        }

        reservations
            .set_status(id, ReservationStatus::Aprovada, Some(current_user.id))
            .await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationResponse::from(updated)))
}

/// Decline a pending reservation (manager only)
#[utoipa::path(
    post,
    path = "/reservations/{id}/decline",
    params(("id" = String, Path, format = "uuid")),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation declined", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not pending"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn decline_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ReservationResponse>> {
    require_manager(&current_user, Section::Reservations)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let updated = {
        let mut reservations = Reservations::new(&mut tx);
        pending_for_update(&mut reservations, id).await?;

        reservations
            .set_status(id, ReservationStatus::Recusada, Some(current_user.id))
            .await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationResponse::from(updated)))
}

/// Cancel a pending reservation (original creator only)
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    params(("id" = String, Path, format = "uuid")),
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation cancelled", body = ReservationResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not pending"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ReservationId>,
) -> Result<Json<ReservationResponse>> {
    require_section(&current_user, Section::Reservations)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let updated = {
        let mut reservations = Reservations::new(&mut tx);
        let reservation = reservations.get_for_update(id).await?.ok_or_else(|| reservation_not_found(id))?;

        // Only the creator may cancel; everyone else sees the same 404
        if reservation.created_by != current_user.id {
            return Err(reservation_not_found(id));
        }
        if reservation.status != ReservationStatus::Pendente {
            return Err(Error::Conflict {
                message: "Reservation has already been processed".to_string(),
            });
        }

        reservations.set_status(id, ReservationStatus::Cancelada, None).await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::models::structure::RoomCreateDBRequest;
    use crate::test_utils::{create_test_app, create_test_config, create_test_user, session_cookie_for};
    use crate::types::RoomId;
    use serde_json::json;
    use sqlx::PgPool;

    async fn seed_room(pool: &PgPool) -> RoomId {
        let mut conn = pool.acquire().await.unwrap();
        Rooms::new(&mut conn)
            .create(&RoomCreateDBRequest {
                name: "Salão de Festas".to_string(),
                description: None,
                capacity: Some(60),
            })
            .await
            .unwrap()
            .id
    }

    fn booking(room_id: RoomId, start: &str, end: &str) -> serde_json::Value {
        json!({
            "room_id": room_id,
            "starts_at": start,
            "ends_at": end,
            "notes": null,
            "user_id": null
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_manager_booking_is_approved_immediately(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let room_id = seed_room(&pool).await;

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", session_cookie_for(&manager, &config))
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: ReservationResponse = response.json();
        assert_eq!(created.status, ReservationStatus::Aprovada);
        assert_eq!(created.processed_by, Some(manager.id));
        assert_eq!(created.user_id, manager.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_doorman_booking_starts_pending(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", session_cookie_for(&doorman, &config))
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: ReservationResponse = response.json();
        assert_eq!(created.status, ReservationStatus::Pendente);
        assert_eq!(created.processed_by, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inverted_period_is_bad_request(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let room_id = seed_room(&pool).await;

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", session_cookie_for(&manager, &config))
            .json(&booking(room_id, "2026-09-10T12:00:00Z", "2026-09-10T10:00:00Z"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_approval_respects_overlap_rule(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;
        let manager_cookie = session_cookie_for(&manager, &config);
        let doorman_cookie = session_cookie_for(&doorman, &config);

        // Approved slot [10:00, 12:00)
        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", manager_cookie.clone())
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        response.assert_status(StatusCode::CREATED);

        // Pending [11:00, 13:00) overlaps, approval is refused
        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie.clone())
            .json(&booking(room_id, "2026-09-10T11:00:00Z", "2026-09-10T13:00:00Z"))
            .await;
        let overlapping: ReservationResponse = response.json();

        let response = server
            .post(&format!("/api/v1/reservations/{}/approve", overlapping.id))
            .add_header("cookie", manager_cookie.clone())
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // Back-to-back [12:00, 14:00) does not overlap and approves fine
        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie)
            .json(&booking(room_id, "2026-09-10T12:00:00Z", "2026-09-10T14:00:00Z"))
            .await;
        let adjacent: ReservationResponse = response.json();

        let response = server
            .post(&format!("/api/v1/reservations/{}/approve", adjacent.id))
            .add_header("cookie", manager_cookie)
            .await;
        response.assert_status(StatusCode::OK);
        let approved: ReservationResponse = response.json();
        assert_eq!(approved.status, ReservationStatus::Aprovada);
        assert_eq!(approved.processed_by, Some(manager.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_concurrent_approvals_cannot_double_book(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;
        let manager_cookie = session_cookie_for(&manager, &config);
        let doorman_cookie = session_cookie_for(&doorman, &config);

        // Two pending reservations whose periods overlap each other
        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie.clone())
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        let first: ReservationResponse = response.json();

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie)
            .json(&booking(room_id, "2026-09-10T11:00:00Z", "2026-09-10T13:00:00Z"))
            .await;
        let second: ReservationResponse = response.json();

        // Approve both at once; the room lock serializes the two transactions
        let (first_response, second_response) = tokio::join!(
            server
                .post(&format!("/api/v1/reservations/{}/approve", first.id))
                .add_header("cookie", manager_cookie.clone()),
            server
                .post(&format!("/api/v1/reservations/{}/approve", second.id))
                .add_header("cookie", manager_cookie),
        );

        let statuses = [first_response.status_code(), second_response.status_code()];
        assert!(statuses.contains(&StatusCode::OK), "one approval must win: {statuses:?}");
        assert!(statuses.contains(&StatusCode::CONFLICT), "the other must conflict: {statuses:?}");

        let approved: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservas WHERE status = 'aprovada'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(approved, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_terminal_states_cannot_be_reprocessed(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;
        let manager_cookie = session_cookie_for(&manager, &config);

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", session_cookie_for(&doorman, &config))
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        let reservation: ReservationResponse = response.json();

        let response = server
            .post(&format!("/api/v1/reservations/{}/decline", reservation.id))
            .add_header("cookie", manager_cookie.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let declined: ReservationResponse = response.json();
        assert_eq!(declined.status, ReservationStatus::Recusada);
        assert_eq!(declined.processed_by, Some(manager.id));

        // Approving or re-declining a declined reservation is a conflict
        let response = server
            .post(&format!("/api/v1/reservations/{}/approve", reservation.id))
            .add_header("cookie", manager_cookie.clone())
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .post(&format!("/api/v1/reservations/{}/decline", reservation.id))
            .add_header("cookie", manager_cookie)
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancel_is_creator_only_and_pending_only(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;
        let doorman_cookie = session_cookie_for(&doorman, &config);

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie.clone())
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        let reservation: ReservationResponse = response.json();

        // The manager did not create it, so for them it does not exist
        let response = server
            .post(&format!("/api/v1/reservations/{}/cancel", reservation.id))
            .add_header("cookie", session_cookie_for(&manager, &config))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post(&format!("/api/v1/reservations/{}/cancel", reservation.id))
            .add_header("cookie", doorman_cookie.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let cancelled: ReservationResponse = response.json();
        assert_eq!(cancelled.status, ReservationStatus::Cancelada);

        // Cancelled is terminal
        let response = server
            .post(&format!("/api/v1/reservations/{}/cancel", reservation.id))
            .add_header("cookie", doorman_cookie)
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_approve_is_manager_only(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let room_id = seed_room(&pool).await;
        let cookie = session_cookie_for(&doorman, &config);

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", cookie.clone())
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        let reservation: ReservationResponse = response.json();

        let response = server
            .post(&format!("/api/v1/reservations/{}/approve", reservation.id))
            .add_header("cookie", cookie)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inactive_room_cannot_be_booked(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let room_id = seed_room(&pool).await;
        let cookie = session_cookie_for(&manager, &config);

        let response = server
            .put(&format!("/api/v1/rooms/{room_id}"))
            .add_header("cookie", cookie.clone())
            .json(&json!({ "name": null, "description": null, "capacity": null, "active": false }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/v1/reservations")
            .add_header("cookie", cookie)
            .json(&booking(room_id, "2026-09-10T10:00:00Z", "2026-09-10T12:00:00Z"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
