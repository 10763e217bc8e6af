//! Request extractors shared by the handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the acting user from a JWT Bearer token.

pub mod auth;
