//! Attached document model.

use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `documentos_solicitud` table.
///
/// `doc_archivo` is the storage path relative to the media root.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DocumentoSolicitud {
    pub doc_id: DbId,
    pub sca_id: DbId,
    pub bsca_id: Option<DbId>,
    pub doc_archivo: String,
    pub doc_fecha_creacion: Timestamp,
    pub doc_fecha_actualizacion: Timestamp,
    pub doc_usuario_actualizacion: Option<DbId>,
}

/// DTO for inserting a document row after its file has been stored.
#[derive(Debug)]
pub struct CreateDocumentoSolicitud {
    pub sca_id: DbId,
    pub bsca_id: Option<DbId>,
    pub doc_archivo: String,
    pub doc_usuario_actualizacion: Option<DbId>,
}
