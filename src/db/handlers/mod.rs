//! Database repositories.
//!
//! One repository per table, each wrapping a `&mut PgConnection` so the
//! caller owns the transaction boundary. All repositories implement the
//! [`repository::Repository`] base trait; lifecycle operations (reservation
//! transitions, visitor checkout, package delivery, read receipts) are
//! inherent methods on the concrete repository.

pub mod communications;
pub mod finance;
pub mod packages;
pub mod repository;
pub mod reservations;
pub mod structure;
pub mod users;
pub mod visitors;
