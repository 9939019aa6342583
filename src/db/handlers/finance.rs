//! Database repository for the finance ledger.

use crate::api::models::finance::TransactionKind;
use crate::types::{abbrev_uuid, TransactionId, UserId};
use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::finance::{FinanceTotalsDBResponse, TransactionCreateDBRequest, TransactionDBResponse},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub skip: i64,
    pub limit: i64,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct Transaction {
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

const TRANSACTION_COLUMNS: &str = "id, descricao AS description, valor AS amount, tipo AS kind, \
                                   categoria AS category, data_transacao AS occurred_at, \
                                   observacoes AS notes, criado_por AS created_by, created_at";

impl From<Transaction> for TransactionDBResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            description: t.description,
            amount: t.amount,
            kind: t.kind,
            category: t.category,
            occurred_at: t.occurred_at,
            notes: t.notes,
            created_by: t.created_by,
            created_at: t.created_at,
        }
    }
}

pub struct Finance<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Finance<'c> {
    type CreateRequest = TransactionCreateDBRequest;
    type Response = TransactionDBResponse;
    type Id = TransactionId;
    type Filter = TransactionFilter;

    #[instrument(skip(self, request), fields(kind = ?request.kind), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "INSERT INTO financeiro
                 (descricao, valor, tipo, categoria, data_transacao, observacoes, criado_por)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(&request.description)
        .bind(request.amount)
        .bind(request.kind)
        .bind(&request.category)
        .bind(request.occurred_at)
        .bind(&request.notes)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(TransactionDBResponse::from(transaction))
    }

    #[instrument(skip(self), fields(transaction_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM financeiro WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(transaction.map(TransactionDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM financeiro
             WHERE ($1::tipo_transacao IS NULL OR tipo = $1)
               AND ($2::timestamptz IS NULL OR data_transacao >= $2)
               AND ($3::timestamptz IS NULL OR data_transacao <= $3)
             ORDER BY data_transacao DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.kind)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(transactions.into_iter().map(TransactionDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM financeiro
             WHERE ($1::tipo_transacao IS NULL OR tipo = $1)
               AND ($2::timestamptz IS NULL OR data_transacao >= $2)
               AND ($3::timestamptz IS NULL OR data_transacao <= $3)",
        )
        .bind(filter.kind)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Finance<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Income and expense totals over an optional period.
    #[instrument(skip(self), err)]
    pub async fn totals(
        &mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<FinanceTotalsDBResponse> {
        let totals = sqlx::query_as::<_, FinanceTotalsDBResponse>(
            "SELECT
                 COALESCE(SUM(valor) FILTER (WHERE tipo = 'receita'), 0) AS income,
                 COALESCE(SUM(valor) FILTER (WHERE tipo = 'despesa'), 0) AS expense
             FROM financeiro
             WHERE ($1::timestamptz IS NULL OR data_transacao >= $1)
               AND ($2::timestamptz IS NULL OR data_transacao <= $2)",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    async fn seed_manager(conn: &mut PgConnection) -> UserId {
        Users::new(conn)
            .create(&UserCreateDBRequest {
                name: "Síndico".to_string(),
                email: "sindico@example.com".to_string(),
                role: Role::Sindico,
                phone: None,
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn entry(created_by: UserId, description: &str, amount: &str, kind: TransactionKind) -> TransactionCreateDBRequest {
        TransactionCreateDBRequest {
            description: description.to_string(),
            amount: amount.parse().unwrap(),
            kind,
            category: None,
            occurred_at: None,
            notes: None,
            created_by,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_totals_split_by_kind(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let manager_id = seed_manager(&mut conn).await;
        let mut repo = Finance::new(&mut conn);

        repo.create(&entry(manager_id, "Taxa condominial", "1500.00", TransactionKind::Receita))
            .await
            .unwrap();
        repo.create(&entry(manager_id, "Manutenção elevador", "423.50", TransactionKind::Despesa))
            .await
            .unwrap();

        let totals = repo.totals(None, None).await.unwrap();
        assert_eq!(totals.income, Decimal::new(150000, 2));
        assert_eq!(totals.expense, Decimal::new(42350, 2));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_totals_empty_ledger_is_zero(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Finance::new(&mut conn);

        let totals = repo.totals(None, None).await.unwrap();
        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.expense, Decimal::ZERO);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_kind(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let manager_id = seed_manager(&mut conn).await;
        let mut repo = Finance::new(&mut conn);

        repo.create(&entry(manager_id, "Taxa", "100.00", TransactionKind::Receita))
            .await
            .unwrap();
        repo.create(&entry(manager_id, "Jardinagem", "80.00", TransactionKind::Despesa))
            .await
            .unwrap();

        let expenses = repo
            .list(&TransactionFilter {
                skip: 0,
                limit: 50,
                kind: Some(TransactionKind::Despesa),
                from: None,
                to: None,
            })
            .await
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Jardinagem");
    }
}
