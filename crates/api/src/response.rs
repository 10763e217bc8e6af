//! Response projections shared by the handlers.
//!
//! Handlers never serialise database rows with their storage paths; documents
//! are always exposed as [`DocumentoLink`]s carrying a public URL.

use std::collections::HashMap;

use serde::Serialize;
use solicitudes_core::bitacora::author_label;
use solicitudes_core::storage::file_name_of;
use solicitudes_core::types::{DbId, Timestamp};
use solicitudes_db::models::bitacora::BitacoraDetalle;
use solicitudes_db::models::documento::DocumentoSolicitud;
use solicitudes_db::models::estado::EstadoSolicitud;
use solicitudes_db::models::solicitud::SolicitudDetalle;

use crate::config::ServerConfig;

/// `{ "mensaje": ... }` envelope for operations without a payload.
#[derive(Debug, Serialize)]
pub struct Mensaje {
    pub mensaje: &'static str,
}

/// A stored document as seen by clients.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentoLink {
    pub doc_id: DbId,
    pub nombre_archivo: String,
    pub url_archivo: String,
}

impl DocumentoLink {
    pub fn new(doc: &DocumentoSolicitud, config: &ServerConfig) -> Self {
        Self {
            doc_id: doc.doc_id,
            nombre_archivo: file_name_of(&doc.doc_archivo).to_string(),
            url_archivo: config.media_url_for(&doc.doc_archivo),
        }
    }
}

/// Flattened help request with its status name, applicant and documents.
#[derive(Debug, Serialize)]
pub struct SolicitudView {
    pub sca_id: DbId,
    pub sca_titulo: String,
    pub sca_descripcion: String,
    pub estado: String,
    pub est_id: DbId,
    pub solicitante_email: String,
    pub sca_fecha_creacion: Timestamp,
    pub sca_fecha_actualizacion: Timestamp,
    pub documentos: Vec<DocumentoLink>,
}

/// Log entry with its author and attachments.
#[derive(Debug, Serialize)]
pub struct BitacoraView {
    pub bsca_id: DbId,
    pub solicitud_id: DbId,
    pub observacion: String,
    pub usuario_email: String,
    pub fecha_creacion: Timestamp,
    pub documentos_adjuntos: Vec<DocumentoLink>,
}

/// Status as listed by the catalogue endpoint.
#[derive(Debug, Serialize)]
pub struct EstadoView {
    pub estado_id: DbId,
    pub estado_nombre: String,
    pub estado_vigencia: bool,
}

impl From<EstadoSolicitud> for EstadoView {
    fn from(estado: EstadoSolicitud) -> Self {
        Self {
            estado_id: estado.est_id,
            estado_nombre: estado.est_nombre,
            estado_vigencia: estado.est_vigencia,
        }
    }
}

/// Group document links by an owner key, preserving document order.
fn group_links<F>(
    documentos: &[DocumentoSolicitud],
    config: &ServerConfig,
    key: F,
) -> HashMap<DbId, Vec<DocumentoLink>>
where
    F: Fn(&DocumentoSolicitud) -> Option<DbId>,
{
    let mut grouped: HashMap<DbId, Vec<DocumentoLink>> = HashMap::new();
    for doc in documentos {
        if let Some(owner) = key(doc) {
            grouped
                .entry(owner)
                .or_default()
                .push(DocumentoLink::new(doc, config));
        }
    }
    grouped
}

/// Attach each request's documents. `documentos` may span several requests.
pub fn solicitud_views(
    solicitudes: Vec<SolicitudDetalle>,
    documentos: &[DocumentoSolicitud],
    config: &ServerConfig,
) -> Vec<SolicitudView> {
    let mut grouped = group_links(documentos, config, |d| Some(d.sca_id));
    solicitudes
        .into_iter()
        .map(|s| SolicitudView {
            documentos: grouped.remove(&s.sca_id).unwrap_or_default(),
            sca_id: s.sca_id,
            sca_titulo: s.sca_titulo,
            sca_descripcion: s.sca_descripcion,
            estado: s.estado,
            est_id: s.est_id,
            solicitante_email: s.solicitante_email,
            sca_fecha_creacion: s.sca_fecha_creacion,
            sca_fecha_actualizacion: s.sca_fecha_actualizacion,
        })
        .collect()
}

/// Attach each log entry's documents. `documentos` may span several entries.
pub fn bitacora_views(
    entradas: Vec<BitacoraDetalle>,
    documentos: &[DocumentoSolicitud],
    config: &ServerConfig,
) -> Vec<BitacoraView> {
    let mut grouped = group_links(documentos, config, |d| d.bsca_id);
    entradas
        .into_iter()
        .map(|b| BitacoraView {
            documentos_adjuntos: grouped.remove(&b.bsca_id).unwrap_or_default(),
            bsca_id: b.bsca_id,
            solicitud_id: b.sca_id,
            usuario_email: author_label(b.usuario_email.as_deref()),
            observacion: b.bsca_observacion,
            fecha_creacion: b.bsca_fecha_creacion,
        })
        .collect()
}
