//! Repository for the `tipos_usuario` table.

use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::tipo_usuario::TipoUsuario;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "tus_id, tus_nombre, tus_vigencia, tus_fecha_creacion";

/// Provides CRUD operations for user types.
pub struct TipoUsuarioRepo;

impl TipoUsuarioRepo {
    /// Insert a new user type, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        nombre: &str,
    ) -> Result<TipoUsuario, sqlx::Error> {
        let query = format!(
            "INSERT INTO tipos_usuario (tus_nombre)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TipoUsuario>(&query)
            .bind(nombre)
            .fetch_one(executor)
            .await
    }

    /// Find a user type by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<TipoUsuario>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tipos_usuario WHERE tus_id = $1");
        sqlx::query_as::<_, TipoUsuario>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all user types ordered by name.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<TipoUsuario>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tipos_usuario ORDER BY tus_nombre ASC");
        sqlx::query_as::<_, TipoUsuario>(&query)
            .fetch_all(executor)
            .await
    }
}
