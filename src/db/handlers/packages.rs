//! Database repository for package deliveries.

use crate::api::models::packages::PackageStatus;
use crate::types::{abbrev_uuid, PackageId, UnitId, UserId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::packages::{PackageCreateDBRequest, PackageDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing packages
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<PackageStatus>,
    pub recipient_id: Option<UserId>,
    pub unit_id: Option<UnitId>,
}

#[derive(Debug, Clone, FromRow)]
struct Package {
    pub id: PackageId,
    pub recipient_id: UserId,
    pub unit_id: UnitId,
    pub store: String,
    pub tracking_code: Option<String>,
    pub received_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub status: PackageStatus,
    pub notes: Option<String>,
    pub registered_by: UserId,
    pub created_at: DateTime<Utc>,
}

const PACKAGE_COLUMNS: &str = "id, destinatario_id AS recipient_id, apartamento_id AS unit_id, \
                               loja AS store, codigo_rastreio AS tracking_code, \
                               data_recebimento AS received_at, data_entrega AS delivered_at, \
                               status, observacoes AS notes, registrado_por AS registered_by, \
                               created_at";

impl From<Package> for PackageDBResponse {
    fn from(p: Package) -> Self {
        Self {
            id: p.id,
            recipient_id: p.recipient_id,
            unit_id: p.unit_id,
            store: p.store,
            tracking_code: p.tracking_code,
            received_at: p.received_at,
            delivered_at: p.delivered_at,
            status: p.status,
            notes: p.notes,
            registered_by: p.registered_by,
            created_at: p.created_at,
        }
    }
}

pub struct Packages<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Packages<'c> {
    type CreateRequest = PackageCreateDBRequest;
    type Response = PackageDBResponse;
    type Id = PackageId;
    type Filter = PackageFilter;

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let package = sqlx::query_as::<_, Package>(&format!(
            "INSERT INTO encomendas
                 (destinatario_id, apartamento_id, loja, codigo_rastreio, observacoes, registrado_por)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PACKAGE_COLUMNS}"
        ))
        .bind(request.recipient_id)
        .bind(request.unit_id)
        .bind(&request.store)
        .bind(&request.tracking_code)
        .bind(&request.notes)
        .bind(request.registered_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(PackageDBResponse::from(package))
    }

    #[instrument(skip(self), fields(package_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let package = sqlx::query_as::<_, Package>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM encomendas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(package.map(PackageDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let packages = sqlx::query_as::<_, Package>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM encomendas
             WHERE ($1::status_encomenda IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR destinatario_id = $2)
               AND ($3::uuid IS NULL OR apartamento_id = $3)
             ORDER BY data_recebimento DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.status)
        .bind(filter.recipient_id)
        .bind(filter.unit_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(packages.into_iter().map(PackageDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM encomendas
             WHERE ($1::status_encomenda IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR destinatario_id = $2)
               AND ($3::uuid IS NULL OR apartamento_id = $3)",
        )
        .bind(filter.status)
        .bind(filter.recipient_id)
        .bind(filter.unit_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Packages<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Hand a package over. Only rows still `aguardando` match; delivering
    /// twice returns [`DbError::NotFound`].
    #[instrument(skip(self), fields(package_id = %abbrev_uuid(&id)), err)]
    pub async fn deliver(&mut self, id: PackageId) -> Result<PackageDBResponse> {
        let package = sqlx::query_as::<_, Package>(&format!(
            "UPDATE encomendas SET status = 'entregue', data_entrega = NOW()
             WHERE id = $1 AND status = 'aguardando'
             RETURNING {PACKAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(PackageDBResponse::from(package))
    }

    /// Packages still at the front desk, for the dashboard.
    #[instrument(skip(self), err)]
    pub async fn count_awaiting(&mut self) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM encomendas WHERE status = 'aguardando'")
                .fetch_one(&mut *self.db)
                .await?;

        Ok(count)
    }
}
