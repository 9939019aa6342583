//! Finance ledger endpoints. Manager-only section.

use crate::{
    AppState,
    api::models::{
        finance::{FinanceSummary, ListTransactionsQuery, TransactionCreate, TransactionResponse},
        pagination::PaginatedResponse,
        users::CurrentUser,
    },
    auth::permissions::{Section, require_section},
    db::{
        handlers::{
            finance::{Finance, TransactionFilter},
            repository::Repository,
        },
        models::finance::TransactionCreateDBRequest,
    },
    errors::{Error, Result},
    types::TransactionId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

/// Record a ledger entry
#[utoipa::path(
    post,
    path = "/transactions",
    request_body = TransactionCreate,
    tag = "finance",
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Non-positive amount"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<TransactionCreate>,
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    require_section(&current_user, Section::Finance)?;

    // The kind carries the sign; amounts are always positive
    if request.amount <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Amount must be positive".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Finance::new(&mut conn)
        .create(&TransactionCreateDBRequest {
            description: request.description,
            amount: request.amount,
            kind: request.kind,
            category: request.category,
            occurred_at: request.occurred_at,
            notes: request.notes,
            created_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(created))))
}

/// List ledger entries
#[utoipa::path(
    get,
    path = "/transactions",
    params(ListTransactionsQuery),
    tag = "finance",
    responses(
        (status = 200, description = "Transactions", body = PaginatedResponse<TransactionResponse>),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<PaginatedResponse<TransactionResponse>>> {
    require_section(&current_user, Section::Finance)?;

    let (skip, limit) = query.pagination.params();
    let filter = TransactionFilter {
        skip,
        limit,
        kind: query.kind,
        from: query.from,
        to: query.to,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut finance = Finance::new(&mut conn);

    let total_count = finance.count(&filter).await?;
    let data = finance.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        data.into_iter().map(TransactionResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a ledger entry by ID
#[utoipa::path(
    get,
    path = "/transactions/{id}",
    params(("id" = String, Path, format = "uuid")),
    tag = "finance",
    responses(
        (status = 200, description = "Transaction", body = TransactionResponse),
        (status = 404, description = "Transaction not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TransactionId>,
) -> Result<Json<TransactionResponse>> {
    require_section(&current_user, Section::Finance)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let transaction = Finance::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Transaction".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(TransactionResponse::from(transaction)))
}

/// Income, expense and balance totals over an optional period
#[utoipa::path(
    get,
    path = "/transactions/summary",
    params(
        ("from" = Option<String>, Query, description = "Only transactions at or after this instant"),
        ("to" = Option<String>, Query, description = "Only transactions at or before this instant"),
    ),
    tag = "finance",
    responses(
        (status = 200, description = "Ledger totals", body = FinanceSummary),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<FinanceSummary>> {
    require_section(&current_user, Section::Finance)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let totals = Finance::new(&mut conn).totals(query.from, query.to).await?;

    Ok(Json(FinanceSummary {
        income: totals.income,
        expense: totals.expense,
        balance: totals.income - totals.expense,
    }))
}
