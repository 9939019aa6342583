//! Resident management endpoints.
//!
//! Residents are never deleted; deactivation happens through the `status`
//! field so history (reservations, packages) keeps its references.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        users::{CurrentUser, ListResidentsQuery, ResidentCreate, ResidentResponse, ResidentUpdate},
    },
    auth::permissions::{Section, require_section},
    db::handlers::{
        repository::Repository,
        users::{UserFilter, Users},
    },
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    errors::{Error, Result},
    types::UserId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Enroll a new resident or portal user
#[utoipa::path(
    post,
    path = "/residents",
    request_body = ResidentCreate,
    tag = "residents",
    responses(
        (status = 201, description = "Resident created", body = ResidentResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_resident(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ResidentCreate>,
) -> Result<(StatusCode, Json<ResidentResponse>)> {
    require_section(&current_user, Section::Residents)?;

    let password_config = &state.config.auth.native.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let password_hash = super::auth::hash_password(request.password.clone(), &state.config).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let created = users
        .create(&UserCreateDBRequest {
            name: request.name,
            email: request.email,
            role: request.role,
            phone: request.phone,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ResidentResponse::from(created))))
}

/// List residents
#[utoipa::path(
    get,
    path = "/residents",
    params(ListResidentsQuery),
    tag = "residents",
    responses(
        (status = 200, description = "Residents", body = PaginatedResponse<ResidentResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_residents(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListResidentsQuery>,
) -> Result<Json<PaginatedResponse<ResidentResponse>>> {
    require_section(&current_user, Section::Residents)?;

    let (skip, limit) = query.pagination.params();
    let filter = UserFilter {
        skip,
        limit,
        status: query.status,
        search: query.search,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let total_count = users.count(&filter).await?;
    let residents = users.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        residents.into_iter().map(ResidentResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a resident by ID
#[utoipa::path(
    get,
    path = "/residents/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "residents",
    responses(
        (status = 200, description = "Resident", body = ResidentResponse),
        (status = 404, description = "Resident not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_resident(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<ResidentResponse>> {
    require_section(&current_user, Section::Residents)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Resident".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(ResidentResponse::from(user)))
}

/// Update a resident's profile, role or status
#[utoipa::path(
    put,
    path = "/residents/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = ResidentUpdate,
    tag = "residents",
    responses(
        (status = 200, description = "Resident updated", body = ResidentResponse),
        (status = 404, description = "Resident not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_resident(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<ResidentUpdate>,
) -> Result<Json<ResidentResponse>> {
    require_section(&current_user, Section::Residents)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let updated = users.update(id, &UserUpdateDBRequest::from(request)).await?;

    Ok(Json(ResidentResponse::from(updated)))
}
