//! HTTP handlers for the `/solicitudes` resource tree.
//!
//! Every mutating handler runs its writes in one transaction. Uploaded files
//! are written to storage before that transaction commits; when it fails, the
//! files recorded in the handler's staging list are discarded.

pub mod bitacora;
pub mod documento;
pub mod estado;
pub mod solicitud;
pub mod usuario;

use solicitudes_core::types::DbId;
use solicitudes_db::models::documento::{CreateDocumentoSolicitud, DocumentoSolicitud};
use solicitudes_db::repositories::DocumentoRepo;
use sqlx::PgConnection;

use crate::error::AppResult;
use crate::form::UploadedFile;
use crate::state::AppState;

/// Write uploaded files for request `sca_id` and return their stored paths.
///
/// Each path is also pushed onto `staged` so the caller can discard it if the
/// surrounding transaction does not commit.
pub(crate) async fn stage_files(
    state: &AppState,
    staged: &mut Vec<String>,
    sca_id: DbId,
    archivos: &[UploadedFile],
) -> AppResult<Vec<String>> {
    let mut paths = Vec::with_capacity(archivos.len());
    for archivo in archivos {
        let relative = state
            .storage
            .save(sca_id, &archivo.file_name, &archivo.bytes)
            .await?;
        staged.push(relative.clone());
        paths.push(relative);
    }
    Ok(paths)
}

/// Insert one document row per stored path.
pub(crate) async fn insert_documents(
    conn: &mut PgConnection,
    sca_id: DbId,
    bsca_id: Option<DbId>,
    paths: &[String],
    editor: DbId,
) -> AppResult<Vec<DocumentoSolicitud>> {
    let mut documentos = Vec::with_capacity(paths.len());
    for path in paths {
        let documento = DocumentoRepo::create(
            &mut *conn,
            &CreateDocumentoSolicitud {
                sca_id,
                bsca_id,
                doc_archivo: path.clone(),
                doc_usuario_actualizacion: Some(editor),
            },
        )
        .await?;
        documentos.push(documento);
    }
    Ok(documentos)
}

/// Remove staged files when `outcome` is an error, then pass it through.
pub(crate) async fn discard_on_error<T>(
    state: &AppState,
    staged: &[String],
    outcome: AppResult<T>,
) -> AppResult<T> {
    if outcome.is_err() && !staged.is_empty() {
        tracing::warn!(count = staged.len(), "Discarding documents of a failed transaction");
        state.storage.discard_all(staged).await;
    }
    outcome
}
