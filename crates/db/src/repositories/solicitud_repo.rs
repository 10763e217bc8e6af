//! Repository for the `solicitudes_ayuda` table.

use solicitudes_core::filters::SolicitudFilter;
use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::solicitud::{
    CreateSolicitudAyuda, SolicitudAyuda, SolicitudDetalle, UpdateSolicitudAyuda,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "sca_id, sca_titulo, sca_descripcion, est_id, solicitante_id, \
                       sca_fecha_creacion, sca_fecha_actualizacion, sca_usuario_actualizacion";

/// Columns of [`SolicitudDetalle`], selected from `s` joined with `e` and `u`.
const DETALLE_COLUMNS: &str = "s.sca_id, s.sca_titulo, s.sca_descripcion, s.est_id, \
                               e.est_nombre AS estado, s.solicitante_id, \
                               u.email AS solicitante_email, s.sca_fecha_creacion, \
                               s.sca_fecha_actualizacion, s.sca_usuario_actualizacion";

const DETALLE_FROM: &str = "solicitudes_ayuda s
             JOIN estados_solicitud e ON e.est_id = s.est_id
             JOIN users u ON u.id = s.solicitante_id";

/// Provides CRUD operations for help requests.
pub struct SolicitudRepo;

impl SolicitudRepo {
    /// Insert a new request, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateSolicitudAyuda,
    ) -> Result<SolicitudAyuda, sqlx::Error> {
        let query = format!(
            "INSERT INTO solicitudes_ayuda (sca_titulo, sca_descripcion, est_id, solicitante_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SolicitudAyuda>(&query)
            .bind(&input.sca_titulo)
            .bind(&input.sca_descripcion)
            .bind(input.est_id)
            .bind(input.solicitante_id)
            .fetch_one(executor)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<SolicitudAyuda>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM solicitudes_ayuda WHERE sca_id = $1");
        sqlx::query_as::<_, SolicitudAyuda>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a request by ID together with its status name and applicant e-mail.
    pub async fn find_detalle<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<SolicitudDetalle>, sqlx::Error> {
        let query = format!("SELECT {DETALLE_COLUMNS} FROM {DETALLE_FROM} WHERE s.sca_id = $1");
        sqlx::query_as::<_, SolicitudDetalle>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List requests matching every supplied predicate of `filter`,
    /// newest first.
    ///
    /// Year/month/day are evaluated in `time_zone` (an IANA name such as
    /// `America/Santiago`).
    pub async fn list_filtered<'e>(
        executor: impl PgExecutor<'e>,
        filter: &SolicitudFilter,
        time_zone: &str,
    ) -> Result<Vec<SolicitudDetalle>, sqlx::Error> {
        let query = format!(
            "SELECT {DETALLE_COLUMNS} FROM {DETALLE_FROM}
             WHERE ($1::BIGINT IS NULL OR s.est_id = $1)
               AND ($2::INT IS NULL OR EXTRACT(YEAR FROM s.sca_fecha_creacion AT TIME ZONE $6) = $2)
               AND ($3::INT IS NULL OR EXTRACT(MONTH FROM s.sca_fecha_creacion AT TIME ZONE $6) = $3)
               AND ($4::INT IS NULL OR EXTRACT(DAY FROM s.sca_fecha_creacion AT TIME ZONE $6) = $4)
               AND ($5::BIGINT IS NULL OR s.solicitante_id = $5)
             ORDER BY s.sca_fecha_creacion DESC, s.sca_id DESC"
        );
        sqlx::query_as::<_, SolicitudDetalle>(&query)
            .bind(filter.estado_id)
            .bind(filter.year)
            .bind(filter.month)
            .bind(filter.day)
            .bind(filter.solicitante_id)
            .bind(time_zone)
            .fetch_all(executor)
            .await
    }

    /// Update a request. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateSolicitudAyuda,
    ) -> Result<Option<SolicitudAyuda>, sqlx::Error> {
        let query = format!(
            "UPDATE solicitudes_ayuda SET
                sca_titulo = COALESCE($2, sca_titulo),
                sca_descripcion = COALESCE($3, sca_descripcion),
                est_id = COALESCE($4, est_id),
                sca_usuario_actualizacion = COALESCE($5, sca_usuario_actualizacion)
             WHERE sca_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SolicitudAyuda>(&query)
            .bind(id)
            .bind(&input.sca_titulo)
            .bind(&input.sca_descripcion)
            .bind(input.est_id)
            .bind(input.sca_usuario_actualizacion)
            .fetch_optional(executor)
            .await
    }

    /// Move a request to status `est_id` unless it is already there.
    ///
    /// Returns `false` when the request does not exist or already has the
    /// target status, so concurrent callers see exactly one transition.
    pub async fn transition<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        est_id: DbId,
        editor: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE solicitudes_ayuda SET est_id = $2, sca_usuario_actualizacion = $3
             WHERE sca_id = $1 AND est_id <> $2",
        )
        .bind(id)
        .bind(est_id)
        .bind(editor)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
