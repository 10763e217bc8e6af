//! Request status lookup model.

use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `estados_solicitud` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EstadoSolicitud {
    pub est_id: DbId,
    pub est_nombre: String,
    pub est_vigencia: bool,
    pub est_fecha_creacion: Timestamp,
}

/// DTO for creating a new status.
#[derive(Debug)]
pub struct CreateEstadoSolicitud {
    pub est_nombre: String,
}
