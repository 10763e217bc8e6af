//! Repository for the `users` table.

use solicitudes_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::user::{CreateUser, UpdateUser, User, UserDetalle};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, rut, first_name, last_name, apellido_materno, telefono, \
                       fecha_nacimiento, sexo, is_active, is_staff, tus_id, date_joined, updated_at";

/// Columns of [`UserDetalle`], selected from `u` left-joined with `t`.
const DETALLE_COLUMNS: &str = "u.id, u.email, u.rut, u.first_name, u.last_name, \
                               u.apellido_materno, u.telefono, u.fecha_nacimiento, u.sexo, \
                               u.is_active, u.tus_id, t.tus_nombre AS tipo_usuario";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, rut, first_name, last_name, apellido_materno)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.rut)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.apellido_materno)
            .fetch_one(executor)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a user by ID joined with its type name.
    pub async fn find_detalle<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<UserDetalle>, sqlx::Error> {
        let query = format!(
            "SELECT {DETALLE_COLUMNS} FROM users u
             LEFT JOIN tipos_usuario t ON t.tus_id = u.tus_id
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserDetalle>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List users matching every supplied predicate, ordered by ID.
    ///
    /// `rut` must already be normalised.
    pub async fn list_filtered<'e>(
        executor: impl PgExecutor<'e>,
        id: Option<DbId>,
        rut: Option<&str>,
    ) -> Result<Vec<UserDetalle>, sqlx::Error> {
        let query = format!(
            "SELECT {DETALLE_COLUMNS} FROM users u
             LEFT JOIN tipos_usuario t ON t.tus_id = u.tus_id
             WHERE ($1::BIGINT IS NULL OR u.id = $1)
               AND ($2::TEXT IS NULL OR u.rut = $2)
             ORDER BY u.id ASC"
        );
        sqlx::query_as::<_, UserDetalle>(&query)
            .bind(id)
            .bind(rut)
            .fetch_all(executor)
            .await
    }

    /// Update a user profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                rut = COALESCE($3, rut),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                apellido_materno = COALESCE($6, apellido_materno),
                telefono = COALESCE($7, telefono),
                fecha_nacimiento = COALESCE($8, fecha_nacimiento),
                sexo = COALESCE($9, sexo)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.rut)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.apellido_materno)
            .bind(&input.telefono)
            .bind(input.fecha_nacimiento)
            .bind(&input.sexo)
            .fetch_optional(executor)
            .await
    }

    /// Set `is_active`. Returns `true` if the row was updated.
    ///
    /// Rows already in the requested state are not touched.
    pub async fn set_active<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        is_active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1 AND is_active <> $2")
                .bind(id)
                .bind(is_active)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign a user type. Returns `None` if the user does not exist.
    pub async fn set_tipo<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        tus_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET tus_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(tus_id)
            .fetch_optional(executor)
            .await
    }
}
