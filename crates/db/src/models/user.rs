//! User model.

use chrono::NaiveDate;
use serde::Serialize;
use solicitudes_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub apellido_materno: String,
    pub telefono: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub tus_id: Option<DbId>,
    pub date_joined: Timestamp,
    pub updated_at: Timestamp,
}

/// A user joined with the name of its type.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserDetalle {
    pub id: DbId,
    pub email: String,
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub apellido_materno: String,
    pub telefono: String,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: String,
    pub is_active: bool,
    pub tus_id: Option<DbId>,
    pub tipo_usuario: Option<String>,
}

/// DTO for inserting a user. Accounts are provisioned outside this service;
/// this is used by seeding tools and tests.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub apellido_materno: String,
}

/// DTO for updating a user profile. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub rut: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub apellido_materno: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.rut.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.apellido_materno.is_none()
            && self.telefono.is_none()
            && self.fecha_nacimiento.is_none()
            && self.sexo.is_none()
    }
}
