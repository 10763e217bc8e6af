//! Help-request model.

use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `solicitudes_ayuda` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SolicitudAyuda {
    pub sca_id: DbId,
    pub sca_titulo: String,
    pub sca_descripcion: String,
    pub est_id: DbId,
    pub solicitante_id: DbId,
    pub sca_fecha_creacion: Timestamp,
    pub sca_fecha_actualizacion: Timestamp,
    pub sca_usuario_actualizacion: Option<DbId>,
}

/// A request joined with its status name and applicant e-mail.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SolicitudDetalle {
    pub sca_id: DbId,
    pub sca_titulo: String,
    pub sca_descripcion: String,
    pub est_id: DbId,
    pub estado: String,
    pub solicitante_id: DbId,
    pub solicitante_email: String,
    pub sca_fecha_creacion: Timestamp,
    pub sca_fecha_actualizacion: Timestamp,
    pub sca_usuario_actualizacion: Option<DbId>,
}

/// DTO for inserting a request.
#[derive(Debug)]
pub struct CreateSolicitudAyuda {
    pub sca_titulo: String,
    pub sca_descripcion: String,
    pub est_id: DbId,
    pub solicitante_id: DbId,
}

/// DTO for updating a request. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateSolicitudAyuda {
    pub sca_titulo: Option<String>,
    pub sca_descripcion: Option<String>,
    pub est_id: Option<DbId>,
    pub sca_usuario_actualizacion: Option<DbId>,
}
