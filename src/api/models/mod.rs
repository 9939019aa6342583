//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request
//! deserialization and response serialization. These models define the
//! public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Wire vocabulary**: enums serialize to the exact Portuguese values the
//!   original store persisted (`sindico`, `pendente`, `aguardando`, ...)
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs

pub mod auth;
pub mod communications;
pub mod dashboard;
pub mod finance;
pub mod packages;
pub mod pagination;
pub mod reservations;
pub mod structure;
pub mod users;
pub mod visitors;
