//! Database layer for data persistence and access.
//!
//! Built on SQLx with PostgreSQL, following the repository pattern: each
//! table gets a repository in [`handlers`] that encapsulates all queries for
//! that entity, operating on record structs from [`models`].
//!
//! # Transactions
//!
//! Repositories wrap a `&mut PgConnection`, so the caller decides the
//! transaction boundary. Multi-step operations (approving a reservation and
//! checking for double bookings, for example) run inside one transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = Reservations::new(&mut tx);
//! // ... lock, validate, transition ...
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in `migrations/` and are exposed through
//! [`crate::migrator`], which the application runs at startup.

pub mod errors;
pub mod handlers;
pub mod models;
