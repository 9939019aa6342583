//! Visitor registration endpoints for the front desk.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        users::CurrentUser,
        visitors::{ListVisitorsQuery, VisitorCreate, VisitorResponse},
    },
    auth::permissions::{Section, require_section},
    db::{
        errors::DbError,
        handlers::{
            repository::Repository,
            visitors::{VisitorFilter, Visitors},
        },
        models::visitors::VisitorCreateDBRequest,
    },
    errors::{Error, Result},
    types::VisitorId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Register a visitor entering the premises
#[utoipa::path(
    post,
    path = "/visitors",
    request_body = VisitorCreate,
    tag = "visitors",
    responses(
        (status = 201, description = "Visitor registered", body = VisitorResponse),
        (status = 400, description = "Unknown unit"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_visitor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<VisitorCreate>,
) -> Result<(StatusCode, Json<VisitorResponse>)> {
    require_section(&current_user, Section::Visitors)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Visitors::new(&mut conn)
        .create(&VisitorCreateDBRequest {
            name: request.name,
            document: request.document,
            unit_id: request.unit_id,
            notes: request.notes,
            registered_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(VisitorResponse::from(created))))
}

/// List visitors
#[utoipa::path(
    get,
    path = "/visitors",
    params(ListVisitorsQuery),
    tag = "visitors",
    responses(
        (status = 200, description = "Visitors", body = PaginatedResponse<VisitorResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_visitors(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListVisitorsQuery>,
) -> Result<Json<PaginatedResponse<VisitorResponse>>> {
    require_section(&current_user, Section::Visitors)?;

    let (skip, limit) = query.pagination.params();
    let filter = VisitorFilter {
        skip,
        limit,
        status: query.status,
        unit_id: None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut visitors = Visitors::new(&mut conn);

    let total_count = visitors.count(&filter).await?;
    let data = visitors.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(VisitorResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a visitor by ID
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "visitors",
    responses(
        (status = 200, description = "Visitor", body = VisitorResponse),
        (status = 404, description = "Visitor not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_visitor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<VisitorId>,
) -> Result<Json<VisitorResponse>> {
    require_section(&current_user, Section::Visitors)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let visitor = Visitors::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Visitor".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(VisitorResponse::from(visitor)))
}

/// Check a visitor out
#[utoipa::path(
    post,
    path = "/visitors/{id}/checkout",
    params(("id" = String, Path, format = "uuid")),
    tag = "visitors",
    responses(
        (status = 200, description = "Visitor checked out", body = VisitorResponse),
        (status = 404, description = "Visitor not found"),
        (status = 409, description = "Visitor has already checked out"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn checkout_visitor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<VisitorId>,
) -> Result<Json<VisitorResponse>> {
    require_section(&current_user, Section::Visitors)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut visitors = Visitors::new(&mut conn);

    match visitors.checkout(id).await {
        Ok(visitor) => Ok(Json(VisitorResponse::from(visitor))),
        // The guarded update misses both absent and already-checked-out rows;
        // a second lookup tells them apart
        Err(DbError::NotFound) => match visitors.get_by_id(id).await? {
            Some(_) => Err(Error::Conflict {
                message: "Visitor has already checked out".to_string(),
            }),
            None => Err(Error::NotFound {
                resource: "Visitor".to_string(),
                id: id.to_string(),
            }),
        },
        Err(e) => Err(e.into()),
    }
}
