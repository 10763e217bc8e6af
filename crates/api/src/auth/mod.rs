//! Bearer-token authentication primitives.
//!
//! Tokens are issued by the identity service; this crate only validates them.
//! [`jwt::generate_access_token`] exists for operational tooling and tests.

pub mod jwt;
