//! Handlers for the request status catalogue.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use solicitudes_core::estados::validate_nombre;
use solicitudes_core::forms::{parse_bool, present};
use solicitudes_core::types::DbId;
use solicitudes_db::models::estado::{CreateEstadoSolicitud, EstadoSolicitud};
use solicitudes_db::repositories::EstadoRepo;

use crate::error::AppResult;
use crate::form::RequestForm;
use crate::middleware::auth::AuthUser;
use crate::response::EstadoView;
use crate::state::AppState;

/// A status as returned right after its creation.
#[derive(Debug, Serialize)]
pub struct EstadoNuevo {
    pub est_id: DbId,
    pub est_nombre: String,
    pub est_vigencia: bool,
}

impl From<EstadoSolicitud> for EstadoNuevo {
    fn from(estado: EstadoSolicitud) -> Self {
        Self {
            est_id: estado.est_id,
            est_nombre: estado.est_nombre,
            est_vigencia: estado.est_vigencia,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstadoCreado {
    pub mensaje: &'static str,
    pub estado: EstadoNuevo,
}

#[derive(Debug, Serialize)]
pub struct EstadosResponse {
    pub mensaje: &'static str,
    pub estados: Vec<EstadoView>,
}

/// POST /solicitudes/estado/crear
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<(StatusCode, Json<EstadoCreado>)> {
    let est_nombre = validate_nombre(form.text("nombre_estado"))?;
    let estado = EstadoRepo::create(&state.pool, &CreateEstadoSolicitud { est_nombre }).await?;

    tracing::info!(user_id = auth.user_id, est_id = estado.est_id, "Estado created");

    Ok((
        StatusCode::CREATED,
        Json(EstadoCreado {
            mensaje: "Estado creado correctamente.",
            estado: estado.into(),
        }),
    ))
}

/// POST /solicitudes/estado/filtrar
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<EstadosResponse>> {
    let solo_vigentes = present(form.text("solo_vigentes"))
        .map(|v| parse_bool("solo_vigentes", v))
        .transpose()?
        .unwrap_or(false);

    let estados = EstadoRepo::list(&state.pool, solo_vigentes).await?;
    Ok(Json(EstadosResponse {
        mensaje: "Registro de estados obtenidos correctamente.",
        estados: estados.into_iter().map(EstadoView::from).collect(),
    }))
}
