//! Handlers for stored request documents.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use solicitudes_core::bitacora::document_deleted_observation;
use solicitudes_core::forms::parse_id;
use solicitudes_core::storage::{content_type_for, file_name_of};
use solicitudes_core::types::DbId;
use solicitudes_db::models::bitacora::CreateBitacoraSolicitud;
use solicitudes_db::repositories::{BitacoraRepo, DocumentoRepo};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::form::RequestForm;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const MSG_DOCUMENT_FETCH_FAILED: &str = "Ocurrió un error inesperado al obtener el documento.";
pub const MSG_DOCUMENTO_NOT_FOUND: &str = "El documento especificado no existe.";
pub const MSG_DOC_ID_REQUIRED: &str = "El campo 'doc_id' es obligatorio.";

#[derive(Debug, Serialize)]
pub struct DocumentoEliminado {
    pub mensaje: &'static str,
    pub doc_id: DbId,
    pub bitacora_id: DbId,
}

/// GET /solicitudes/documento/{doc_id}
///
/// Streams the stored file inline. Every failure, an unknown id included,
/// is reported as a 500 carrying the underlying message.
pub async fn fetch(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(doc_id): Path<String>,
) -> AppResult<Response> {
    stream_document(&state, &doc_id).await.map_err(|e| {
        tracing::warn!(doc_id = %doc_id, error = %e, "Document fetch failed");
        AppError::internal(MSG_DOCUMENT_FETCH_FAILED, e)
    })
}

async fn stream_document(state: &AppState, raw_id: &str) -> AppResult<Response> {
    let doc_id = parse_id("doc_id", raw_id)?;
    let documento = DocumentoRepo::find_by_id(&state.pool, doc_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_DOCUMENTO_NOT_FOUND))?;

    let (file, len) = state.storage.open(&documento.doc_archivo).await?;
    let file_name = file_name_of(&documento.doc_archivo);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(file_name))
        .header(header::CONTENT_LENGTH, len.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{file_name}\""),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::internal(MSG_DOCUMENT_FETCH_FAILED, e))
}

/// POST /solicitudes/documento/eliminar
///
/// Deletes the document row and logs the removal on the owning request, then
/// removes the stored file once that has committed. A file that is already
/// missing or cannot be removed is logged, not reported.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<DocumentoEliminado>> {
    let doc_id = form.required_id("doc_id", MSG_DOC_ID_REQUIRED)?;

    let documento = DocumentoRepo::find_by_id(&state.pool, doc_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_DOCUMENTO_NOT_FOUND))?;
    let file_name = file_name_of(&documento.doc_archivo).to_string();

    let mut tx = state.pool.begin().await?;

    if !DocumentoRepo::delete(&mut *tx, doc_id).await? {
        return Err(AppError::not_found(MSG_DOCUMENTO_NOT_FOUND));
    }

    let entrada = BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id: documento.sca_id,
            bsca_observacion: document_deleted_observation(&file_name),
            usuario_id: Some(auth.user_id),
            bsca_usuario_actualizacion: Some(auth.user_id),
        },
    )
    .await?;

    tx.commit().await?;

    match state.storage.delete(&documento.doc_archivo).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            doc_id,
            path = %documento.doc_archivo,
            "Stored document was already missing",
        ),
        Err(e) => tracing::error!(
            doc_id,
            path = %documento.doc_archivo,
            error = %e,
            "Failed to remove stored document",
        ),
    }

    tracing::info!(
        user_id = auth.user_id,
        sca_id = documento.sca_id,
        doc_id,
        "Documento deleted",
    );

    Ok(Json(DocumentoEliminado {
        mensaje: "Documento eliminado correctamente.",
        doc_id,
        bitacora_id: entrada.bsca_id,
    }))
}
