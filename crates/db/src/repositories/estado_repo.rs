//! Repository for the `estados_solicitud` table.

use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::estado::{CreateEstadoSolicitud, EstadoSolicitud};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "est_id, est_nombre, est_vigencia, est_fecha_creacion";

/// Provides access to the request status catalogue.
pub struct EstadoRepo;

impl EstadoRepo {
    /// Insert a new status, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateEstadoSolicitud,
    ) -> Result<EstadoSolicitud, sqlx::Error> {
        let query = format!(
            "INSERT INTO estados_solicitud (est_nombre)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EstadoSolicitud>(&query)
            .bind(&input.est_nombre)
            .fetch_one(executor)
            .await
    }

    /// Find a status by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<EstadoSolicitud>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM estados_solicitud WHERE est_id = $1");
        sqlx::query_as::<_, EstadoSolicitud>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List statuses ordered by ID, optionally only the active ones.
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
        solo_vigentes: bool,
    ) -> Result<Vec<EstadoSolicitud>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM estados_solicitud
             WHERE ($1 = false OR est_vigencia = true)
             ORDER BY est_id ASC"
        );
        sqlx::query_as::<_, EstadoSolicitud>(&query)
            .bind(solo_vigentes)
            .fetch_all(executor)
            .await
    }
}
