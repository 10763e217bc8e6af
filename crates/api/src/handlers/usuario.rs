//! Handlers for user administration and user types.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use solicitudes_core::forms::{parse_date, parse_id, parse_optional_id, present};
use solicitudes_core::usuarios::{
    normalize_rut, validate_email, validate_rut, validate_sexo, validate_tipo_nombre, Activation,
    MSG_ASSIGN_REQUIRED, MSG_MODIFY_NOTHING, MSG_TIPO_NOT_FOUND, MSG_USUARIO_ID_REQUIRED,
    MSG_USUARIO_NOT_FOUND,
};
use solicitudes_core::types::DbId;
use solicitudes_db::models::tipo_usuario::TipoUsuario;
use solicitudes_db::models::user::{UpdateUser, UserDetalle};
use solicitudes_db::repositories::{TipoUsuarioRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::form::RequestForm;
use crate::middleware::auth::AuthUser;
use crate::response::Mensaje;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TipoCreado {
    pub mensaje: &'static str,
    pub tipo: TipoUsuario,
}

#[derive(Debug, Serialize)]
pub struct TiposResponse {
    pub mensaje: &'static str,
    pub tipos: Vec<TipoUsuario>,
}

#[derive(Debug, Serialize)]
pub struct UsuarioResponse {
    pub mensaje: &'static str,
    pub usuario: UserDetalle,
}

async fn load_detalle(state: &AppState, id: DbId) -> AppResult<UserDetalle> {
    UserRepo::find_detalle(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_USUARIO_NOT_FOUND))
}

// ---------------------------------------------------------------------------
// User types
// ---------------------------------------------------------------------------

/// POST /solicitudes/tipo/crear
pub async fn create_tipo(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<(StatusCode, Json<TipoCreado>)> {
    let nombre = validate_tipo_nombre(form.text("nombre_tipo"))?;
    let tipo = TipoUsuarioRepo::create(&state.pool, &nombre).await?;

    tracing::info!(user_id = auth.user_id, tus_id = tipo.tus_id, "Tipo de usuario created");

    Ok((
        StatusCode::CREATED,
        Json(TipoCreado {
            mensaje: "Tipo de usuario creado correctamente.",
            tipo,
        }),
    ))
}

/// POST /solicitudes/tipo/ver
pub async fn list_tipos(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<TiposResponse>> {
    let tipos = TipoUsuarioRepo::list(&state.pool).await?;
    Ok(Json(TiposResponse {
        mensaje: "Tipos de usuario obtenidos correctamente.",
        tipos,
    }))
}

/// POST /solicitudes/tipo/usuario
pub async fn assign_tipo(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<UsuarioResponse>> {
    let (Some(usuario_id), Some(tipo_id)) =
        (present(form.text("usuario_id")), present(form.text("tipo_id")))
    else {
        return Err(AppError::validation(MSG_ASSIGN_REQUIRED));
    };
    let usuario_id = parse_id("usuario_id", usuario_id)?;
    let tipo_id = parse_id("tipo_id", tipo_id)?;

    TipoUsuarioRepo::find_by_id(&state.pool, tipo_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_TIPO_NOT_FOUND))?;
    UserRepo::set_tipo(&state.pool, usuario_id, tipo_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_USUARIO_NOT_FOUND))?;

    tracing::info!(user_id = auth.user_id, usuario_id, tus_id = tipo_id, "Tipo de usuario assigned");

    Ok(Json(UsuarioResponse {
        mensaje: "Tipo de usuario asignado correctamente.",
        usuario: load_detalle(&state, usuario_id).await?,
    }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /solicitudes/usuario/lista
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<Vec<UserDetalle>>> {
    let id = parse_optional_id("id", form.text("id"))?;
    let rut = present(form.text("rut")).map(normalize_rut);

    let usuarios = UserRepo::list_filtered(&state.pool, id, rut.as_deref()).await?;
    Ok(Json(usuarios))
}

/// Validate the optional profile fields of a modify request.
fn parse_update(form: &RequestForm) -> AppResult<UpdateUser> {
    let text = |name: &str| present(form.text(name)).map(|v| v.trim().to_string());

    Ok(UpdateUser {
        email: present(form.text("email")).map(validate_email).transpose()?,
        rut: present(form.text("rut")).map(validate_rut).transpose()?,
        first_name: text("first_name"),
        last_name: text("last_name"),
        apellido_materno: text("apellido_materno"),
        telefono: text("telefono"),
        fecha_nacimiento: present(form.text("fecha_nacimiento"))
            .map(|v| parse_date("fecha_nacimiento", v))
            .transpose()?,
        sexo: present(form.text("sexo")).map(validate_sexo).transpose()?,
    })
}

/// POST /solicitudes/usuario/modificar
pub async fn modify(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<UsuarioResponse>> {
    let usuario_id = form.required_id("usuario_id", MSG_USUARIO_ID_REQUIRED)?;
    let update = parse_update(&form)?;
    if update.is_empty() {
        return Err(AppError::validation(MSG_MODIFY_NOTHING));
    }

    UserRepo::update(&state.pool, usuario_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_USUARIO_NOT_FOUND))?;

    tracing::info!(user_id = auth.user_id, usuario_id, "Usuario modified");

    Ok(Json(UsuarioResponse {
        mensaje: "Usuario modificado correctamente.",
        usuario: load_detalle(&state, usuario_id).await?,
    }))
}

/// POST /solicitudes/usuario/desactivar_usuario
pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<Mensaje>> {
    toggle_active(&state, &auth, &form, Activation::Deactivate).await
}

/// POST /solicitudes/usuario/activar_usuario
pub async fn activate(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<Mensaje>> {
    toggle_active(&state, &auth, &form, Activation::Activate).await
}

/// Persist the activation only when the user is not already in that state.
async fn toggle_active(
    state: &AppState,
    auth: &AuthUser,
    form: &RequestForm,
    activation: Activation,
) -> AppResult<Json<Mensaje>> {
    let usuario_id = form.required_id("usuario_id", MSG_USUARIO_ID_REQUIRED)?;
    let usuario = UserRepo::find_by_id(&state.pool, usuario_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_USUARIO_NOT_FOUND))?;

    if !activation.requires_update(usuario.is_active) {
        return Ok(Json(Mensaje {
            mensaje: activation.already_message(),
        }));
    }

    if !UserRepo::set_active(&state.pool, usuario_id, activation.target()).await? {
        // Another request toggled it in the meantime.
        return Ok(Json(Mensaje {
            mensaje: activation.already_message(),
        }));
    }

    tracing::info!(
        user_id = auth.user_id,
        usuario_id,
        is_active = activation.target(),
        "Usuario activation changed",
    );

    Ok(Json(Mensaje {
        mensaje: activation.done_message(),
    }))
}
