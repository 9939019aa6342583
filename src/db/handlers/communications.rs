//! Database repository for communications.

use crate::api::models::communications::CommunicationKind;
use crate::types::{abbrev_uuid, BlockId, CommunicationId, UnitId, UserId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::communications::{CommunicationCreateDBRequest, CommunicationDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing communications
#[derive(Debug, Clone, Default)]
pub struct CommunicationFilter {
    pub skip: i64,
    pub limit: i64,
    pub kind: Option<CommunicationKind>,
    pub unread_only: bool,
}

#[derive(Debug, Clone, FromRow)]
struct Communication {
    pub id: CommunicationId,
    pub title: String,
    pub content: String,
    pub kind: CommunicationKind,
    pub sender_id: UserId,
    pub recipient_id: Option<UserId>,
    pub unit_id: Option<UnitId>,
    pub block_id: Option<BlockId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

const COMMUNICATION_COLUMNS: &str = "id, titulo AS title, conteudo AS content, tipo AS kind, \
                                     remetente_id AS sender_id, destinatario_id AS recipient_id, \
                                     apartamento_id AS unit_id, bloco_id AS block_id, \
                                     is_lida AS read, created_at";

impl From<Communication> for CommunicationDBResponse {
    fn from(c: Communication) -> Self {
        Self {
            id: c.id,
            title: c.title,
            content: c.content,
            kind: c.kind,
            sender_id: c.sender_id,
            recipient_id: c.recipient_id,
            unit_id: c.unit_id,
            block_id: c.block_id,
            read: c.read,
            created_at: c.created_at,
        }
    }
}

pub struct Communications<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Communications<'c> {
    type CreateRequest = CommunicationCreateDBRequest;
    type Response = CommunicationDBResponse;
    type Id = CommunicationId;
    type Filter = CommunicationFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let communication = sqlx::query_as::<_, Communication>(&format!(
            "INSERT INTO comunicacoes
                 (titulo, conteudo, tipo, remetente_id, destinatario_id, apartamento_id, bloco_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COMMUNICATION_COLUMNS}"
        ))
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.kind)
        .bind(request.sender_id)
        .bind(request.recipient_id)
        .bind(request.unit_id)
        .bind(request.block_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CommunicationDBResponse::from(communication))
    }

    #[instrument(skip(self), fields(communication_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let communication = sqlx::query_as::<_, Communication>(&format!(
            "SELECT {COMMUNICATION_COLUMNS} FROM comunicacoes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(communication.map(CommunicationDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let communications = sqlx::query_as::<_, Communication>(&format!(
            "SELECT {COMMUNICATION_COLUMNS} FROM comunicacoes
             WHERE ($1::tipo_comunicacao IS NULL OR tipo = $1)
               AND (NOT $2 OR is_lida = FALSE)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.kind)
        .bind(filter.unread_only)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(communications.into_iter().map(CommunicationDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comunicacoes
             WHERE ($1::tipo_comunicacao IS NULL OR tipo = $1)
               AND (NOT $2 OR is_lida = FALSE)",
        )
        .bind(filter.kind)
        .bind(filter.unread_only)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Communications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Mark a communication as read. Idempotent; marking an already read row
    /// succeeds and leaves it read.
    #[instrument(skip(self), fields(communication_id = %abbrev_uuid(&id)), err)]
    pub async fn mark_read(&mut self, id: CommunicationId) -> Result<CommunicationDBResponse> {
        let communication = sqlx::query_as::<_, Communication>(&format!(
            "UPDATE comunicacoes SET is_lida = TRUE
             WHERE id = $1
             RETURNING {COMMUNICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(CommunicationDBResponse::from(communication))
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn seed_sender(conn: &mut PgConnection) -> UserId {
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

    fn broadcast(sender_id: UserId, title: &str, kind: CommunicationKind) -> CommunicationCreateDBRequest {
        CommunicationCreateDBRequest {
            title: title.to_string(),
            content: "Conteúdo".to_string(),
            kind,
            sender_id,
            recipient_id: None,
            unit_id: None,
            block_id: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_mark_read_is_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let sender_id = seed_sender(&mut conn).await;
        let mut repo = Communications::new(&mut conn);

        let created = repo
            .create(&broadcast(sender_id, "Aviso", CommunicationKind::Comunicado))
            .await
            .unwrap();
        assert!(!created.read);

        let read = repo.mark_read(created.id).await.unwrap();
        assert!(read.read);

        let again = repo.mark_read(created.id).await.unwrap();
        assert!(again.read);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_kind_and_unread(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let sender_id = seed_sender(&mut conn).await;
        let mut repo = Communications::new(&mut conn);

        let notice = repo
            .create(&broadcast(sender_id, "Manutenção", CommunicationKind::Comunicado))
            .await
            .unwrap();
        repo.create(&broadcast(sender_id, "Olá", CommunicationKind::Mensagem))
            .await
            .unwrap();
        repo.mark_read(notice.id).await.unwrap();

        let notices = repo
            .list(&CommunicationFilter {
                skip: 0,
                limit: 50,
                kind: Some(CommunicationKind::Comunicado),
                unread_only: false,
            })
            .await
            .unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Manutenção");

        let unread = repo
            .list(&CommunicationFilter {
                skip: 0,
                limit: 50,
                kind: None,
                unread_only: true,
            })
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Olá");
    }
}
