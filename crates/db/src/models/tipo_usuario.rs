//! User type model.

use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tipos_usuario` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TipoUsuario {
    pub tus_id: DbId,
    pub tus_nombre: String,
    pub tus_vigencia: bool,
    pub tus_fecha_creacion: Timestamp,
}
