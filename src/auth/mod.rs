//! Authentication and authorization system.
//!
//! # Authentication
//!
//! Browser-based authentication using secure HTTP-only cookies:
//! - Staff log in via `/authentication/login` with email/password
//! - A signed JWT is stored in a secure, HTTP-only cookie
//! - Tokens are self-contained and expire after `auth.security.jwt_expiry`
//!
//! Residents (`morador`) have no portal login; only managers and doormen
//! authenticate.
//!
//! # Authorization
//!
//! Access control is section-based: each role can reach a fixed set of
//! portal sections, and handlers guard themselves with
//! [`permissions::require_section`]. Sections outside the caller's reach
//! answer with 404, not 403.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Section reachability and access control logic
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
