//! Communication endpoints: messages, notifications and announcements.

use crate::{
    AppState,
    api::models::{
        communications::{CommunicationCreate, CommunicationResponse, ListCommunicationsQuery},
        pagination::PaginatedResponse,
        users::CurrentUser,
    },
    auth::permissions::{Section, require_section},
    db::{
        errors::DbError,
        handlers::{
            communications::{CommunicationFilter, Communications},
            repository::Repository,
        },
        models::communications::CommunicationCreateDBRequest,
    },
    errors::{Error, Result},
    types::CommunicationId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Send a communication
///
/// At most one target (recipient, unit or block) may be set; no target means
/// the whole condominium.
#[utoipa::path(
    post,
    path = "/communications",
    request_body = CommunicationCreate,
    tag = "communications",
    responses(
        (status = 201, description = "Communication sent", body = CommunicationResponse),
        (status = 400, description = "More than one target set"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_communication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CommunicationCreate>,
) -> Result<(StatusCode, Json<CommunicationResponse>)> {
    require_section(&current_user, Section::Communications)?;

    if request.target.count() > 1 {
        return Err(Error::BadRequest {
            message: "At most one target (recipient, unit or block) may be set".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Communications::new(&mut conn)
        .create(&CommunicationCreateDBRequest {
            title: request.title,
            content: request.content,
            kind: request.kind,
            sender_id: current_user.id,
            recipient_id: request.target.recipient_id,
            unit_id: request.target.unit_id,
            block_id: request.target.block_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommunicationResponse::from(created))))
}

/// List communications
#[utoipa::path(
    get,
    path = "/communications",
    params(ListCommunicationsQuery),
    tag = "communications",
    responses(
        (status = 200, description = "Communications", body = PaginatedResponse<CommunicationResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_communications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListCommunicationsQuery>,
) -> Result<Json<PaginatedResponse<CommunicationResponse>>> {
    require_section(&current_user, Section::Communications)?;

    let (skip, limit) = query.pagination.params();
    let filter = CommunicationFilter {
        skip,
        limit,
        kind: query.kind,
        unread_only: query.unread_only.unwrap_or(false),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut communications = Communications::new(&mut conn);

    let total_count = communications.count(&filter).await?;
    let data = communications.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(CommunicationResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a communication by ID
#[utoipa::path(
    get,
    path = "/communications/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "communications",
    responses(
        (status = 200, description = "Communication", body = CommunicationResponse),
        (status = 404, description = "Communication not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_communication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CommunicationId>,
) -> Result<Json<CommunicationResponse>> {
    require_section(&current_user, Section::Communications)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let communication = Communications::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Communication".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(CommunicationResponse::from(communication)))
}

/// Mark a communication as read
#[utoipa::path(
    post,
    path = "/communications/{id}/read",
    params(("id" = String, Path, format = "uuid")),
    tag = "communications",
    responses(
        (status = 200, description = "Communication marked as read", body = CommunicationResponse),
        (status = 404, description = "Communication not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn mark_communication_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CommunicationId>,
) -> Result<Json<CommunicationResponse>> {
    require_section(&current_user, Section::Communications)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let communication = Communications::new(&mut conn).mark_read(id).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            resource: "Communication".to_string(),
            id: id.to_string(),
        },
        e => e.into(),
    })?;

    Ok(Json(CommunicationResponse::from(communication)))
}
