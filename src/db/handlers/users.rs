//! Database repository for residents / portal users.

use crate::types::{abbrev_uuid, UserId};
use crate::{
    api::models::users::{ResidentStatus, Role},
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<ResidentStatus>,
    pub search: Option<String>,
}

// Database entity model; columns aliased to English field names
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub status: ResidentStatus,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, nome AS name, email, user_tipo AS role, telefone AS phone, \
                            status, password_hash, created_at, updated_at";

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            status: user.status,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO usuarios (nome, email, user_tipo, telefone, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.role)
        .bind(&request.phone)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM usuarios WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios
             WHERE ($1::status_morador IS NULL OR status = $1)
               AND ($2::text IS NULL OR nome ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%')
             ORDER BY nome
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.status)
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users.into_iter().map(UserDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM usuarios
             WHERE ($1::status_morador IS NULL OR status = $1)
               AND ($2::text IS NULL OR nome ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%')",
        )
        .bind(filter.status)
        .bind(filter.search.as_deref())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM usuarios WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    /// Update a user; absent fields keep their current value.
    /// Users are never deleted, only deactivated through `status`.
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE usuarios SET
                 nome = COALESCE($2, nome),
                 telefone = COALESCE($3, telefone),
                 user_tipo = COALESCE($4, user_tipo),
                 status = COALESCE($5, status),
                 password_hash = COALESCE($6, password_hash),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.phone)
        .bind(request.role)
        .bind(request.status)
        .bind(&request.password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(UserDBResponse::from(user))
    }

    /// Residents with status `ativo`, for the dashboard.
    #[instrument(skip(self), err)]
    pub async fn count_active(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM usuarios WHERE status = 'ativo'")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    fn create_request(name: &str, email: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            name: name.to_string(),
            email: email.to_string(),
            role,
            phone: None,
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&create_request("Maria Silva", "maria@example.com", Role::Sindico))
            .await
            .unwrap();
        assert_eq!(created.name, "Maria Silva");
        assert_eq!(created.role, Role::Sindico);
        assert_eq!(created.status, ResidentStatus::Ativo);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "maria@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("A", "dup@example.com", Role::Porteiro)).await.unwrap();
        let err = repo
            .create(&create_request("B", "dup@example.com", Role::Porteiro))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_status_and_search(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let a = repo.create(&create_request("Ana", "ana@example.com", Role::Morador)).await.unwrap();
        repo.create(&create_request("Bruno", "bruno@example.com", Role::Morador))
            .await
            .unwrap();

        // Deactivate Ana
        repo.update(
            a.id,
            &UserUpdateDBRequest {
                status: Some(ResidentStatus::Inativo),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let active = repo
            .list(&UserFilter {
                skip: 0,
                limit: 50,
                status: Some(ResidentStatus::Ativo),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Bruno");

        let found = repo
            .list(&UserFilter {
                skip: 0,
                limit: 50,
                status: None,
                search: Some("ana@".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana");

        assert_eq!(repo.count_active().await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_user_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let err = repo
            .update(uuid::Uuid::new_v4(), &UserUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
