//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - The section guard for the caller's role
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout, session restore and password change
//! - [`communications`]: Messages, notifications and announcements
//! - [`dashboard`]: Entity counts for the landing page
//! - [`finance`]: Ledger entries and totals
//! - [`packages`]: Package registration and delivery
//! - [`reservations`]: Booking workflow (create, approve, decline, cancel)
//! - [`residents`]: Resident enrollment and management
//! - [`structure`]: Blocks, units and bookable rooms
//! - [`visitors`]: Visitor registration and checkout
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the right HTTP
//! status code and a user-safe message.

pub mod auth;
pub mod communications;
pub mod dashboard;
pub mod finance;
pub mod packages;
pub mod reservations;
pub mod residents;
pub mod structure;
pub mod visitors;
