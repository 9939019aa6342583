//! Package (encomenda) tracking endpoints.

use crate::{
    AppState,
    api::models::{
        packages::{ListPackagesQuery, PackageCreate, PackageResponse},
        pagination::PaginatedResponse,
        users::CurrentUser,
    },
    auth::permissions::{Section, require_section},
    db::{
        errors::DbError,
        handlers::{
            packages::{PackageFilter, Packages},
            repository::Repository,
        },
        models::packages::PackageCreateDBRequest,
    },
    errors::{Error, Result},
    types::PackageId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Register a package received at the front desk
#[utoipa::path(
    post,
    path = "/packages",
    request_body = PackageCreate,
    tag = "packages",
    responses(
        (status = 201, description = "Package registered", body = PackageResponse),
        (status = 400, description = "Unknown recipient or unit"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<PackageCreate>,
) -> Result<(StatusCode, Json<PackageResponse>)> {
    require_section(&current_user, Section::Packages)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Packages::new(&mut conn)
        .create(&PackageCreateDBRequest {
            recipient_id: request.recipient_id,
            unit_id: request.unit_id,
            store: request.store,
            tracking_code: request.tracking_code,
            notes: request.notes,
            registered_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PackageResponse::from(created))))
}

/// List packages
#[utoipa::path(
    get,
    path = "/packages",
    params(ListPackagesQuery),
    tag = "packages",
    responses(
        (status = 200, description = "Packages", body = PaginatedResponse<PackageResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_packages(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListPackagesQuery>,
) -> Result<Json<PaginatedResponse<PackageResponse>>> {
    require_section(&current_user, Section::Packages)?;

    let (skip, limit) = query.pagination.params();
    let filter = PackageFilter {
        skip,
        limit,
        status: query.status,
        recipient_id: None,
        unit_id: None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut packages = Packages::new(&mut conn);

    let total_count = packages.count(&filter).await?;
    let data = packages.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(PackageResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a package by ID
#[utoipa::path(
    get,
    path = "/packages/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "packages",
    responses(
        (status = 200, description = "Package", body = PackageResponse),
        (status = 404, description = "Package not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PackageId>,
) -> Result<Json<PackageResponse>> {
    require_section(&current_user, Section::Packages)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let package = Packages::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Package".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(PackageResponse::from(package)))
}

/// Mark a package as delivered to its recipient
#[utoipa::path(
    post,
    path = "/packages/{id}/deliver",
    params(("id" = String, Path, format = "uuid")),
    tag = "packages",
    responses(
        (status = 200, description = "Package delivered", body = PackageResponse),
        (status = 404, description = "Package not found"),
        (status = 409, description = "Package has already been delivered"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn deliver_package(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PackageId>,
) -> Result<Json<PackageResponse>> {
    require_section(&current_user, Section::Packages)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut packages = Packages::new(&mut conn);

    match packages.deliver(id).await {
        Ok(package) => Ok(Json(PackageResponse::from(package))),
        // The guarded update misses both absent and already-delivered rows
        Err(DbError::NotFound) => match packages.get_by_id(id).await? {
            Some(_) => Err(Error::Conflict {
                message: "Package has already been delivered".to_string(),
            }),
            None => Err(Error::NotFound {
                resource: "Package".to_string(),
                id: id.to_string(),
            }),
        },
        Err(e) => Err(e.into()),
    }
}
