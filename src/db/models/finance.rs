//! Database models for the finance ledger.

use crate::api::models::finance::TransactionKind;
use crate::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct TransactionCreateDBRequest {
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: UserId,
}

/// Ledger totals over a period; balance is derived in the API layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FinanceTotalsDBResponse {
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone)]
pub struct TransactionDBResponse {
    pub id: TransactionId,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
