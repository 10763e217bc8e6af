//! Repository for the `documentos_solicitud` table.

use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::documento::{CreateDocumentoSolicitud, DocumentoSolicitud};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "doc_id, sca_id, bsca_id, doc_archivo, doc_fecha_creacion, \
                       doc_fecha_actualizacion, doc_usuario_actualizacion";

/// Provides CRUD operations for request documents.
pub struct DocumentoRepo;

impl DocumentoRepo {
    /// Insert a document row, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDocumentoSolicitud,
    ) -> Result<DocumentoSolicitud, sqlx::Error> {
        let query = format!(
            "INSERT INTO documentos_solicitud (sca_id, bsca_id, doc_archivo, doc_usuario_actualizacion)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentoSolicitud>(&query)
            .bind(input.sca_id)
            .bind(input.bsca_id)
            .bind(&input.doc_archivo)
            .bind(input.doc_usuario_actualizacion)
            .fetch_one(executor)
            .await
    }

    /// Find a document by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<DocumentoSolicitud>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documentos_solicitud WHERE doc_id = $1");
        sqlx::query_as::<_, DocumentoSolicitud>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List the documents of every request in `sca_ids`, oldest first.
    pub async fn list_by_solicitudes<'e>(
        executor: impl PgExecutor<'e>,
        sca_ids: &[DbId],
    ) -> Result<Vec<DocumentoSolicitud>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documentos_solicitud
             WHERE sca_id = ANY($1)
             ORDER BY doc_id ASC"
        );
        sqlx::query_as::<_, DocumentoSolicitud>(&query)
            .bind(sca_ids)
            .fetch_all(executor)
            .await
    }

    /// List the documents attached to any of the log entries in `bsca_ids`.
    pub async fn list_by_bitacoras<'e>(
        executor: impl PgExecutor<'e>,
        bsca_ids: &[DbId],
    ) -> Result<Vec<DocumentoSolicitud>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documentos_solicitud
             WHERE bsca_id = ANY($1)
             ORDER BY doc_id ASC"
        );
        sqlx::query_as::<_, DocumentoSolicitud>(&query)
            .bind(bsca_ids)
            .fetch_all(executor)
            .await
    }

    /// Delete a document row by ID. Returns `true` if a row was deleted.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documentos_solicitud WHERE doc_id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
