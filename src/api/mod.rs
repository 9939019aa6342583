//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, logout, session, password change
//! - **Domain sections** (`/api/v1/*`): Residents, structure, reservations,
//!   visitors, packages, communications, finance and the dashboard
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. API documentation
//! is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
