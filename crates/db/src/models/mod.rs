//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Joined read models where handlers need related names
//! - `Create*` / `Update*` DTOs consumed by the repositories

pub mod bitacora;
pub mod documento;
pub mod estado;
pub mod solicitud;
pub mod tipo_usuario;
pub mod user;
