//! Domain types and rules for the help-request tracker.
//!
//! Everything in this crate is independent of HTTP and of the database so it
//! can be unit-tested in isolation.

pub mod bitacora;
pub mod error;
pub mod estados;
pub mod filters;
pub mod forms;
pub mod solicitudes;
pub mod storage;
pub mod types;
pub mod usuarios;
