//! API request/response models for the finance ledger.

use super::pagination::Pagination;
use crate::db::models::finance::TransactionDBResponse;
use crate::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Ledger entry kind, persisted as the `tipo_transacao` enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tipo_transacao", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Income
    Receita,
    /// Expense
    Despesa,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionCreate {
    pub description: String,
    /// Monetary amount, always positive; the kind carries the sign
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
    /// When the money moved; defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TransactionId,
    pub description: String,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionDBResponse> for TransactionResponse {
    fn from(db: TransactionDBResponse) -> Self {
        Self {
            id: db.id,
            description: db.description,
            amount: db.amount,
            kind: db.kind,
            category: db.category,
            occurred_at: db.occurred_at,
            notes: db.notes,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}

/// Aggregate totals over the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinanceSummary {
    #[schema(value_type = String, example = "1200.00")]
    pub income: Decimal,
    #[schema(value_type = String, example = "450.00")]
    pub expense: Decimal,
    /// income minus expense
    #[schema(value_type = String, example = "750.00")]
    pub balance: Decimal,
}

/// Query parameters for listing transactions
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTransactionsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by kind (income vs expense)
    pub kind: Option<TransactionKind>,

    /// Only transactions that occurred at or after this instant
    pub from: Option<DateTime<Utc>>,

    /// Only transactions that occurred before this instant
    pub to: Option<DateTime<Utc>>,
}
