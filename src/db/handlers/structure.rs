//! Database repositories for blocks, units and rooms.

use crate::types::{abbrev_uuid, BlockId, RoomId, UnitId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::structure::{
        BlockCreateDBRequest, BlockDBResponse, RoomCreateDBRequest, RoomDBResponse,
        RoomUpdateDBRequest, UnitCreateDBRequest, UnitDBResponse,
    },
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Blocks

#[derive(Debug, Clone, Default)]
pub struct BlockFilter {
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, FromRow)]
struct Block {
    pub id: BlockId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

const BLOCK_COLUMNS: &str = "id, nome AS name, descricao AS description, created_at";

impl From<Block> for BlockDBResponse {
    fn from(block: Block) -> Self {
        Self {
            id: block.id,
            name: block.name,
            description: block.description,
            created_at: block.created_at,
        }
    }
}

pub struct Blocks<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Blocks<'c> {
    type CreateRequest = BlockCreateDBRequest;
    type Response = BlockDBResponse;
    type Id = BlockId;
    type Filter = BlockFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let block = sqlx::query_as::<_, Block>(&format!(
            "INSERT INTO blocos (nome, descricao)
             VALUES ($1, $2)
             RETURNING {BLOCK_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(BlockDBResponse::from(block))
    }

    #[instrument(skip(self), fields(block_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let block = sqlx::query_as::<_, Block>(&format!("SELECT {BLOCK_COLUMNS} FROM blocos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(block.map(BlockDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let blocks = sqlx::query_as::<_, Block>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocos ORDER BY nome LIMIT $1 OFFSET $2"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(blocks.into_iter().map(BlockDBResponse::from).collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn count(&mut self, _filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blocos")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

impl<'c> Blocks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

// Units

#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub skip: i64,
    pub limit: i64,
    pub block_id: Option<BlockId>,
}

#[derive(Debug, Clone, FromRow)]
struct Unit {
    pub id: UnitId,
    pub number: String,
    pub block_id: BlockId,
    pub created_at: DateTime<Utc>,
}

const UNIT_COLUMNS: &str = "id, numero AS number, bloco_id AS block_id, created_at";

impl From<Unit> for UnitDBResponse {
    fn from(unit: Unit) -> Self {
        Self {
            id: unit.id,
            number: unit.number,
            block_id: unit.block_id,
            created_at: unit.created_at,
        }
    }
}

pub struct Units<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Units<'c> {
    type CreateRequest = UnitCreateDBRequest;
    type Response = UnitDBResponse;
    type Id = UnitId;
    type Filter = UnitFilter;

    #[instrument(skip(self, request), fields(number = %request.number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let unit = sqlx::query_as::<_, Unit>(&format!(
            "INSERT INTO apartamentos (numero, bloco_id)
             VALUES ($1, $2)
             RETURNING {UNIT_COLUMNS}"
        ))
        .bind(&request.number)
        .bind(request.block_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(UnitDBResponse::from(unit))
    }

    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let unit =
            sqlx::query_as::<_, Unit>(&format!("SELECT {UNIT_COLUMNS} FROM apartamentos WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(unit.map(UnitDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let units = sqlx::query_as::<_, Unit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM apartamentos
             WHERE ($1::uuid IS NULL OR bloco_id = $1)
             ORDER BY numero
             LIMIT $2 OFFSET $3"
        ))
        .bind(filter.block_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(units.into_iter().map(UnitDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM apartamentos WHERE ($1::uuid IS NULL OR bloco_id = $1)",
        )
        .bind(filter.block_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Units<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

// Rooms

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub skip: i64,
    pub limit: i64,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

const ROOM_COLUMNS: &str =
    "id, nome AS name, descricao AS description, capacidade AS capacity, ativo AS active, created_at";

impl From<Room> for RoomDBResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
            description: room.description,
            capacity: room.capacity,
            active: room.active,
            created_at: room.created_at,
        }
    }
}

pub struct Rooms<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Rooms<'c> {
    type CreateRequest = RoomCreateDBRequest;
    type Response = RoomDBResponse;
    type Id = RoomId;
    type Filter = RoomFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "INSERT INTO ambientes (nome, descricao, capacidade)
             VALUES ($1, $2, $3)
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.capacity)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(RoomDBResponse::from(room))
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let room = sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM ambientes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room.map(RoomDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM ambientes
             WHERE ($1::boolean IS NULL OR ativo = $1)
             ORDER BY nome
             LIMIT $2 OFFSET $3"
        ))
        .bind(filter.active)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rooms.into_iter().map(RoomDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ambientes WHERE ($1::boolean IS NULL OR ativo = $1)",
        )
        .bind(filter.active)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

impl<'c> Rooms<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch a room and lock its row for the rest of the transaction.
    ///
    /// The room row serializes booking decisions: every path that approves a
    /// reservation locks the room before counting approved overlaps, so two
    /// concurrent approvals for the same room cannot both see a free slot.
    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    pub async fn get_for_update(&mut self, id: RoomId) -> Result<Option<RoomDBResponse>> {
        let room = sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM ambientes WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room.map(RoomDBResponse::from))
    }

    /// Update a room; absent fields keep their current value.
    /// Rooms referenced by reservations are deactivated through `active`,
    /// never deleted.
    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: RoomId, request: &RoomUpdateDBRequest) -> Result<RoomDBResponse> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "UPDATE ambientes SET
                 nome = COALESCE($2, nome),
                 descricao = COALESCE($3, descricao),
                 capacidade = COALESCE($4, capacidade),
                 ativo = COALESCE($5, ativo)
             WHERE id = $1
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.capacity)
        .bind(request.active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(RoomDBResponse::from(room))
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_block_and_unit_create(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let block = Blocks::new(&mut conn)
            .create(&BlockCreateDBRequest {
                name: "Bloco A".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(block.name, "Bloco A");

        let unit = Units::new(&mut conn)
            .create(&UnitCreateDBRequest {
                number: "101".to_string(),
                block_id: block.id,
            })
            .await
            .unwrap();
        assert_eq!(unit.block_id, block.id);

        // Same number in the same block is rejected
        let err = Units::new(&mut conn)
            .create(&UnitCreateDBRequest {
                number: "101".to_string(),
                block_id: block.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unit_with_unknown_block_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let err = Units::new(&mut conn)
            .create(&UnitCreateDBRequest {
                number: "101".to_string(),
                block_id: uuid::Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_room_deactivation_and_filter(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut rooms = Rooms::new(&mut conn);

        let salon = rooms
            .create(&RoomCreateDBRequest {
                name: "Salão de Festas".to_string(),
                description: None,
                capacity: Some(80),
            })
            .await
            .unwrap();
        rooms
            .create(&RoomCreateDBRequest {
                name: "Churrasqueira".to_string(),
                description: None,
                capacity: None,
            })
            .await
            .unwrap();

        let updated = rooms
            .update(
                salon.id,
                &RoomUpdateDBRequest {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.active);

        let active = rooms
            .list(&RoomFilter {
                skip: 0,
                limit: 50,
                active: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Churrasqueira");
    }
}
