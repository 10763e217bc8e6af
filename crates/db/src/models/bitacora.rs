//! Audit-log entry model.

use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `bitacoras_solicitud` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BitacoraSolicitud {
    pub bsca_id: DbId,
    pub sca_id: DbId,
    pub bsca_observacion: String,
    pub usuario_id: Option<DbId>,
    pub bsca_fecha_creacion: Timestamp,
    pub bsca_fecha_actualizacion: Timestamp,
    pub bsca_usuario_actualizacion: Option<DbId>,
}

/// A log entry joined with its author's e-mail (absent once the user is deleted).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BitacoraDetalle {
    pub bsca_id: DbId,
    pub sca_id: DbId,
    pub bsca_observacion: String,
    pub usuario_id: Option<DbId>,
    pub usuario_email: Option<String>,
    pub bsca_fecha_creacion: Timestamp,
}

/// DTO for appending a log entry.
#[derive(Debug)]
pub struct CreateBitacoraSolicitud {
    pub sca_id: DbId,
    pub bsca_observacion: String,
    pub usuario_id: Option<DbId>,
    pub bsca_usuario_actualizacion: Option<DbId>,
}
