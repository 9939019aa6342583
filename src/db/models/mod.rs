//! Database record models matching table schemas.
//!
//! Each model struct matches a table row (or the request shape used to
//! insert/update one). Table and enum names stay in the original Portuguese
//! wire vocabulary; Rust field names are English and mapped via column
//! aliases in the repository queries.
//!
//! Database models are distinct from API models so the storage and API
//! representations can evolve independently.

pub mod communications;
pub mod finance;
pub mod packages;
pub mod reservations;
pub mod structure;
pub mod users;
pub mod visitors;
