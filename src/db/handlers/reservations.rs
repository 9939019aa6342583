//! Database repository for room reservations.
//!
//! Status transitions are performed by the API layer inside a transaction:
//! the row is locked with [`Reservations::get_for_update`], the transition is
//! validated, and on approval [`Reservations::overlapping_approved`] guards
//! against double booking before [`Reservations::set_status`] commits it.

use crate::api::models::reservations::ReservationStatus;
use crate::types::{abbrev_uuid, ReservationId, RoomId, UserId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::reservations::{ReservationCreateDBRequest, ReservationDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing reservations
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<ReservationStatus>,
    pub room_id: Option<RoomId>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, FromRow)]
struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_by: UserId,
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

const RESERVATION_COLUMNS: &str = "id, ambiente_id AS room_id, usuario_id AS user_id, \
                                   data_inicio AS starts_at, data_fim AS ends_at, status, \
                                   observacoes AS notes, criado_por AS created_by, \
                                   aprovado_por AS processed_by, created_at";

impl From<Reservation> for ReservationDBResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            room_id: r.room_id,
            user_id: r.user_id,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            status: r.status,
            notes: r.notes,
            created_by: r.created_by,
            processed_by: r.processed_by,
            created_at: r.created_at,
        }
    }
}

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Reservations<'c> {
    type CreateRequest = ReservationCreateDBRequest;
    type Response = ReservationDBResponse;
    type Id = ReservationId;
    type Filter = ReservationFilter;

    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&request.room_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "INSERT INTO reservas
                 (ambiente_id, usuario_id, data_inicio, data_fim, status, observacoes,
                  criado_por, aprovado_por)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(request.room_id)
        .bind(request.user_id)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.status)
        .bind(&request.notes)
        .bind(request.created_by)
        .bind(request.processed_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ReservationDBResponse::from(reservation))
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(reservation.map(ReservationDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservas
             WHERE ($1::status_reserva IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR ambiente_id = $2)
               AND ($3::uuid IS NULL OR usuario_id = $3)
             ORDER BY data_inicio DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.status)
        .bind(filter.room_id)
        .bind(filter.user_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations.into_iter().map(ReservationDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservas
             WHERE ($1::status_reserva IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR ambiente_id = $2)
               AND ($3::uuid IS NULL OR usuario_id = $3)",
        )
        .bind(filter.status)
        .bind(filter.room_id)
        .bind(filter.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch a reservation and lock its row for the current transaction.
    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    pub async fn get_for_update(&mut self, id: ReservationId) -> Result<Option<ReservationDBResponse>> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservas WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(reservation.map(ReservationDBResponse::from))
    }

    /// Count approved reservations for a room overlapping the half-open
    /// interval `[starts_at, ends_at)`, optionally excluding one row.
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&room_id)), err)]
    pub async fn overlapping_approved(
        &mut self,
        room_id: RoomId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservas
             WHERE ambiente_id = $1
               AND status = 'aprovada'
               AND data_inicio < $3
               AND $2 < data_fim
               AND ($4::uuid IS NULL OR id <> $4)",
        )
        .bind(room_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(exclude)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    /// Move a reservation to a new status, recording who processed it.
    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id), status = ?status), err)]
    pub async fn set_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        processed_by: Option<UserId>,
    ) -> Result<ReservationDBResponse> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservas SET status = $2, aprovado_por = COALESCE($3, aprovado_por)
             WHERE id = $1
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(processed_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ReservationDBResponse::from(reservation))
    }

    /// Reservations awaiting a manager decision, for the dashboard.
    #[instrument(skip(self), err)]
    pub async fn count_pending(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservas WHERE status = 'pendente'")
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
    use crate::db::handlers::structure::Rooms;
    use crate::db::handlers::users::Users;
    use crate::db::models::structure::RoomCreateDBRequest;
    use crate::db::models::users::UserCreateDBRequest;
    use chrono::{Duration, Utc};
    use sqlx::PgPool;

    async fn seed(conn: &mut PgConnection) -> (RoomId, UserId) {
        let room = Rooms::new(conn)
            .create(&RoomCreateDBRequest {
                name: "Salão de Festas".to_string(),
                description: None,
                capacity: Some(80),
            })
            .await
            .unwrap();
        let user = Users::new(conn)
            .create(&UserCreateDBRequest {
                name: "Maria".to_string(),
                email: "maria@example.com".to_string(),
                role: Role::Morador,
                phone: None,
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap();
        (room.id, user.id)
    }

    fn request(
        room_id: RoomId,
        user_id: UserId,
        status: ReservationStatus,
        offset_hours: i64,
    ) -> ReservationCreateDBRequest {
        let starts_at = Utc::now() + Duration::hours(offset_hours);
        ReservationCreateDBRequest {
            room_id,
            user_id,
            starts_at,
            ends_at: starts_at + Duration::hours(2),
            status,
            notes: None,
            created_by: user_id,
            processed_by: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_transition(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (room_id, user_id) = seed(&mut conn).await;
        let mut repo = Reservations::new(&mut conn);

        let created = repo
            .create(&request(room_id, user_id, ReservationStatus::Pendente, 24))
            .await
            .unwrap();
        assert_eq!(created.status, ReservationStatus::Pendente);
        assert!(created.processed_by.is_none());

        let approved = repo
            .set_status(created.id, ReservationStatus::Aprovada, Some(user_id))
            .await
            .unwrap();
        assert_eq!(approved.status, ReservationStatus::Aprovada);
        assert_eq!(approved.processed_by, Some(user_id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_overlap_counts_only_approved(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (room_id, user_id) = seed(&mut conn).await;
        let mut repo = Reservations::new(&mut conn);

        let approved = repo
            .create(&request(room_id, user_id, ReservationStatus::Aprovada, 24))
            .await
            .unwrap();
        repo.create(&request(room_id, user_id, ReservationStatus::Pendente, 24))
            .await
            .unwrap();

        // Overlapping window sees the approved row but not the pending one
        let overlapping = repo
            .overlapping_approved(room_id, approved.starts_at, approved.ends_at, None)
            .await
            .unwrap();
        assert_eq!(overlapping, 1);

        // Excluding the approved row itself clears the window
        let overlapping = repo
            .overlapping_approved(room_id, approved.starts_at, approved.ends_at, Some(approved.id))
            .await
            .unwrap();
        assert_eq!(overlapping, 0);

        // Back-to-back slots share an endpoint and do not overlap
        let overlapping = repo
            .overlapping_approved(
                room_id,
                approved.ends_at,
                approved.ends_at + Duration::hours(2),
                None,
            )
            .await
            .unwrap();
        assert_eq!(overlapping, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inverted_interval_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (room_id, user_id) = seed(&mut conn).await;
        let mut repo = Reservations::new(&mut conn);

        let mut bad = request(room_id, user_id, ReservationStatus::Pendente, 24);
        bad.ends_at = bad.starts_at - Duration::hours(1);

        let err = repo.create(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_and_count_pending(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (room_id, user_id) = seed(&mut conn).await;
        let mut repo = Reservations::new(&mut conn);

        repo.create(&request(room_id, user_id, ReservationStatus::Pendente, 24))
            .await
            .unwrap();
        repo.create(&request(room_id, user_id, ReservationStatus::Aprovada, 48))
            .await
            .unwrap();

        let pending = repo
            .list(&ReservationFilter {
                skip: 0,
                limit: 50,
                status: Some(ReservationStatus::Pendente),
                room_id: None,
                user_id: None,
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        assert_eq!(repo.count_pending().await.unwrap(), 1);
    }
}
