//! Database repository for visitor entries.

use crate::api::models::visitors::VisitorStatus;
use crate::types::{abbrev_uuid, UnitId, VisitorId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::visitors::{VisitorCreateDBRequest, VisitorDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing visitors
#[derive(Debug, Clone, Default)]
pub struct VisitorFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<VisitorStatus>,
    pub unit_id: Option<UnitId>,
}

#[derive(Debug, Clone, FromRow)]
struct Visitor {
    pub id: VisitorId,
    pub name: String,
    pub document: String,
    pub unit_id: UnitId,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub status: VisitorStatus,
    pub notes: Option<String>,
    pub registered_by: crate::types::UserId,
    pub created_at: DateTime<Utc>,
}

const VISITOR_COLUMNS: &str = "id, nome AS name, documento AS document, \
                               apartamento_id AS unit_id, data_entrada AS entered_at, \
                               data_saida AS left_at, status, observacoes AS notes, \
                               registrado_por AS registered_by, created_at";

impl From<Visitor> for VisitorDBResponse {
    fn from(v: Visitor) -> Self {
        Self {
            id: v.id,
            name: v.name,
            document: v.document,
            unit_id: v.unit_id,
            entered_at: v.entered_at,
            left_at: v.left_at,
            status: v.status,
            notes: v.notes,
            registered_by: v.registered_by,
            created_at: v.created_at,
        }
    }
}

pub struct Visitors<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Visitors<'c> {
    type CreateRequest = VisitorCreateDBRequest;
    type Response = VisitorDBResponse;
    type Id = VisitorId;
    type Filter = VisitorFilter;

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let visitor = sqlx::query_as::<_, Visitor>(&format!(
            "INSERT INTO visitantes (nome, documento, apartamento_id, observacoes, registrado_por)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VISITOR_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.document)
        .bind(request.unit_id)
        .bind(&request.notes)
        .bind(request.registered_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(VisitorDBResponse::from(visitor))
    }

    #[instrument(skip(self), fields(visitor_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let visitor = sqlx::query_as::<_, Visitor>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitantes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(visitor.map(VisitorDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let visitors = sqlx::query_as::<_, Visitor>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitantes
             WHERE ($1::status_visitante IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR apartamento_id = $2)
             ORDER BY data_entrada DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.status)
        .bind(filter.unit_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(visitors.into_iter().map(VisitorDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM visitantes
             WHERE ($1::status_visitante IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR apartamento_id = $2)",
        )
        .bind(filter.status)
        .bind(filter.unit_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Visitors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record a visitor leaving. Only rows still `ativo` match; checking out
    /// twice returns [`DbError::NotFound`].
    #[instrument(skip(self), fields(visitor_id = %abbrev_uuid(&id)), err)]
    pub async fn checkout(&mut self, id: VisitorId) -> Result<VisitorDBResponse> {
        let visitor = sqlx::query_as::<_, Visitor>(&format!(
            "UPDATE visitantes SET status = 'saiu', data_saida = NOW()
             WHERE id = $1 AND status = 'ativo'
             RETURNING {VISITOR_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(VisitorDBResponse::from(visitor))
    }

    /// Visitors currently on site, for the dashboard.
    #[instrument(skip(self), err)]
    pub async fn count_on_site(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visitantes WHERE status = 'ativo'")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::structure::{Blocks, Units};
    use crate::db::handlers::users::Users;
    use crate::db::models::structure::{BlockCreateDBRequest, UnitCreateDBRequest};
    use crate::db::models::users::UserCreateDBRequest;
    use crate::types::UserId;
    use sqlx::PgPool;

    async fn seed(conn: &mut PgConnection) -> (UnitId, UserId) {
        let block = Blocks::new(conn)
            .create(&BlockCreateDBRequest {
                name: "Bloco A".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let unit = Units::new(conn)
            .create(&UnitCreateDBRequest {
                number: "101".to_string(),
                block_id: block.id,
            })
            .await
            .unwrap();
        let doorman = Users::new(conn)
            .create(&UserCreateDBRequest {
                name: "João".to_string(),
                email: "joao@example.com".to_string(),
                role: Role::Porteiro,
                phone: None,
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap();
        (unit.id, doorman.id)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_checkout_is_not_repeatable(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (unit_id, doorman_id) = seed(&mut conn).await;
        let mut repo = Visitors::new(&mut conn);

        let visitor = repo
            .create(&VisitorCreateDBRequest {
                name: "Carlos".to_string(),
                document: "12.345.678-9".to_string(),
                unit_id,
                notes: None,
                registered_by: doorman_id,
            })
            .await
            .unwrap();
        assert_eq!(visitor.status, VisitorStatus::Ativo);
        assert!(visitor.left_at.is_none());
        assert_eq!(repo.count_on_site().await.unwrap(), 1);

        let out = repo.checkout(visitor.id).await.unwrap();
        assert_eq!(out.status, VisitorStatus::Saiu);
        assert!(out.left_at.is_some());
        assert_eq!(repo.count_on_site().await.unwrap(), 0);

        let err = repo.checkout(visitor.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_status(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (unit_id, doorman_id) = seed(&mut conn).await;
        let mut repo = Visitors::new(&mut conn);

        let a = repo
            .create(&VisitorCreateDBRequest {
                name: "A".to_string(),
                document: "1".to_string(),
                unit_id,
                notes: None,
                registered_by: doorman_id,
            })
            .await
            .unwrap();
        repo.create(&VisitorCreateDBRequest {
            name: "B".to_string(),
            document: "2".to_string(),
            unit_id,
            notes: None,
            registered_by: doorman_id,
        })
        .await
        .unwrap();
        repo.checkout(a.id).await.unwrap();

        let on_site = repo
            .list(&VisitorFilter {
                skip: 0,
                limit: 50,
                status: Some(VisitorStatus::Ativo),
                unit_id: None,
            })
            .await
            .unwrap();
        assert_eq!(on_site.len(), 1);
        assert_eq!(on_site[0].name, "B");
    }
}
