//! Repository for the `bitacoras_solicitud` table.

use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::bitacora::{BitacoraDetalle, BitacoraSolicitud, CreateBitacoraSolicitud};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "bsca_id, sca_id, bsca_observacion, usuario_id, bsca_fecha_creacion, \
                       bsca_fecha_actualizacion, bsca_usuario_actualizacion";

/// Columns of [`BitacoraDetalle`], selected from `b` left-joined with `u`.
const DETALLE_COLUMNS: &str = "b.bsca_id, b.sca_id, b.bsca_observacion, b.usuario_id, \
                               u.email AS usuario_email, b.bsca_fecha_creacion";

/// Provides append and read access to request audit logs.
pub struct BitacoraRepo;

impl BitacoraRepo {
    /// Append a log entry, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateBitacoraSolicitud,
    ) -> Result<BitacoraSolicitud, sqlx::Error> {
        let query = format!(
            "INSERT INTO bitacoras_solicitud
                (sca_id, bsca_observacion, usuario_id, bsca_usuario_actualizacion)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BitacoraSolicitud>(&query)
            .bind(input.sca_id)
            .bind(&input.bsca_observacion)
            .bind(input.usuario_id)
            .bind(input.bsca_usuario_actualizacion)
            .fetch_one(executor)
            .await
    }

    /// Find a log entry by ID, joined with its author's e-mail.
    pub async fn find_detalle<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<BitacoraDetalle>, sqlx::Error> {
        let query = format!(
            "SELECT {DETALLE_COLUMNS} FROM bitacoras_solicitud b
             LEFT JOIN users u ON u.id = b.usuario_id
             WHERE b.bsca_id = $1"
        );
        sqlx::query_as::<_, BitacoraDetalle>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every entry of a request, newest first.
    pub async fn list_by_solicitud<'e>(
        executor: impl PgExecutor<'e>,
        sca_id: DbId,
    ) -> Result<Vec<BitacoraDetalle>, sqlx::Error> {
        let query = format!(
            "SELECT {DETALLE_COLUMNS} FROM bitacoras_solicitud b
             LEFT JOIN users u ON u.id = b.usuario_id
             WHERE b.sca_id = $1
             ORDER BY b.bsca_fecha_creacion DESC, b.bsca_id DESC"
        );
        sqlx::query_as::<_, BitacoraDetalle>(&query)
            .bind(sca_id)
            .fetch_all(executor)
            .await
    }

    /// Number of entries recorded for a request.
    pub async fn count_by_solicitud<'e>(
        executor: impl PgExecutor<'e>,
        sca_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bitacoras_solicitud WHERE sca_id = $1")
            .bind(sca_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}
