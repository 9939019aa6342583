//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is basically a data access layer for a postgres table. Each
/// repository wraps a `&mut PgConnection` so callers decide the transaction
/// boundary, and exposes strongly typed operations on one entity.
use crate::db::errors::Result;

/// Base repository trait providing the operations every entity supports.
///
/// Entities with richer lifecycles (reservation transitions, visitor
/// checkout, package delivery) add inherent methods on top of this trait.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities with filtering and pagination
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Count entities matching the filter (ignoring pagination)
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64>;
}
