//! Handlers for help requests: create, modify, filter and annul.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use solicitudes_core::bitacora::CREATION_OBSERVATION;
use solicitudes_core::filters::SolicitudFilter;
use solicitudes_core::solicitudes::{
    annulment_observation, compose_observation, plan_changes, Cambio, CambiosSolicitados,
    EstadoActual, NuevaSolicitud, DOCUMENTS_FIELD, MSG_ALREADY_ANNULLED, MSG_ANNULLED_MISSING,
    MSG_ESTADO_NOT_FOUND, MSG_NO_CHANGES, MSG_SCA_ID_REQUIRED, MSG_SOLICITUD_NOT_FOUND,
};
use solicitudes_core::storage::{file_name_of, sanitize_file_name};
use solicitudes_core::types::DbId;
use solicitudes_db::models::bitacora::CreateBitacoraSolicitud;
use solicitudes_db::models::solicitud::{CreateSolicitudAyuda, UpdateSolicitudAyuda};
use solicitudes_db::repositories::{BitacoraRepo, DocumentoRepo, EstadoRepo, SolicitudRepo};

use super::{discard_on_error, insert_documents, stage_files};
use crate::error::{AppError, AppResult};
use crate::form::{RequestForm, UploadedFile};
use crate::middleware::auth::AuthUser;
use crate::response::{solicitud_views, SolicitudView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SolicitudResponse {
    pub mensaje: &'static str,
    pub solicitud: SolicitudView,
}

#[derive(Debug, Serialize)]
pub struct ModificacionResponse {
    pub mensaje: &'static str,
    pub solicitud: SolicitudView,
    pub cambios: Vec<String>,
}

/// Response for operations that may end without changes.
#[derive(Debug, Serialize)]
pub struct SinCambiosResponse {
    pub mensaje: &'static str,
    pub sca_id: DbId,
}

/// Load the flattened projection of one request.
async fn load_view(state: &AppState, sca_id: DbId) -> AppResult<SolicitudView> {
    let detalle = SolicitudRepo::find_detalle(&state.pool, sca_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;
    let documentos = DocumentoRepo::list_by_solicitudes(&state.pool, &[sca_id]).await?;
    solicitud_views(vec![detalle], &documentos, &state.config)
        .pop()
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /solicitudes/crear
///
/// Creates a request owned by the acting user, stores any `documentos_data`
/// files and records the creation log entry, all in one transaction.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    mut form: RequestForm,
) -> AppResult<(StatusCode, Json<SolicitudResponse>)> {
    let nueva = NuevaSolicitud::parse(
        form.text("sca_titulo"),
        form.text("sca_descripcion"),
        form.text("est_id"),
    )?;
    let archivos = form.take_files(DOCUMENTS_FIELD);

    EstadoRepo::find_by_id(&state.pool, nueva.est_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_ESTADO_NOT_FOUND))?;

    let mut staged = Vec::new();
    let outcome = create_in_tx(&state, auth.user_id, &nueva, &archivos, &mut staged).await;
    let sca_id = discard_on_error(&state, &staged, outcome).await?;

    tracing::info!(
        user_id = auth.user_id,
        sca_id,
        est_id = nueva.est_id,
        documentos = archivos.len(),
        "Solicitud created",
    );

    let solicitud = load_view(&state, sca_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SolicitudResponse {
            mensaje: "Solicitud creada correctamente.",
            solicitud,
        }),
    ))
}

async fn create_in_tx(
    state: &AppState,
    user_id: DbId,
    nueva: &NuevaSolicitud,
    archivos: &[UploadedFile],
    staged: &mut Vec<String>,
) -> AppResult<DbId> {
    let mut tx = state.pool.begin().await?;

    let solicitud = SolicitudRepo::create(
        &mut *tx,
        &CreateSolicitudAyuda {
            sca_titulo: nueva.titulo.clone(),
            sca_descripcion: nueva.descripcion.clone(),
            est_id: nueva.est_id,
            solicitante_id: user_id,
        },
    )
    .await?;

    let paths = stage_files(state, staged, solicitud.sca_id, archivos).await?;
    insert_documents(&mut *tx, solicitud.sca_id, None, &paths, user_id).await?;

    BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id: solicitud.sca_id,
            bsca_observacion: CREATION_OBSERVATION.to_string(),
            usuario_id: Some(user_id),
            bsca_usuario_actualizacion: Some(user_id),
        },
    )
    .await?;

    tx.commit().await?;
    Ok(solicitud.sca_id)
}

// ---------------------------------------------------------------------------
// Modify
// ---------------------------------------------------------------------------

/// POST /solicitudes/modificar
///
/// Applies every supplied value that differs from the stored one and records
/// a single composite log entry. New files are attached to both the request
/// and that entry.
pub async fn modify(
    State(state): State<AppState>,
    auth: AuthUser,
    mut form: RequestForm,
) -> AppResult<Response> {
    let sca_id = form.required_id("sca_id", MSG_SCA_ID_REQUIRED)?;
    let archivos = form.take_files(DOCUMENTS_FIELD);
    let requested = CambiosSolicitados::parse(
        form.text("sca_titulo"),
        form.text("sca_descripcion"),
        form.text("est_id"),
        archivos
            .iter()
            .map(|a| sanitize_file_name(&a.file_name))
            .collect(),
    )?;

    let actual = SolicitudRepo::find_detalle(&state.pool, sca_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;

    let nuevo_estado = match requested.est_id {
        Some(est_id) => Some(
            EstadoRepo::find_by_id(&state.pool, est_id)
                .await?
                .ok_or_else(|| AppError::not_found(MSG_ESTADO_NOT_FOUND))?,
        ),
        None => None,
    };

    let cambios = plan_changes(
        &EstadoActual {
            titulo: &actual.sca_titulo,
            descripcion: &actual.sca_descripcion,
            est_id: actual.est_id,
            estado_nombre: &actual.estado,
        },
        &requested,
        nuevo_estado.as_ref().map(|e| e.est_nombre.as_str()),
    );

    if cambios.is_empty() {
        tracing::debug!(user_id = auth.user_id, sca_id, "Solicitud modification without changes");
        return Ok(Json(SinCambiosResponse {
            mensaje: MSG_NO_CHANGES,
            sca_id,
        })
        .into_response());
    }

    let mut staged = Vec::new();
    let outcome = modify_in_tx(
        &state,
        auth.user_id,
        sca_id,
        &requested,
        cambios,
        &archivos,
        &mut staged,
    )
    .await;
    let descripciones = discard_on_error(&state, &staged, outcome).await?;

    tracing::info!(
        user_id = auth.user_id,
        sca_id,
        cambios = descripciones.len(),
        "Solicitud modified",
    );

    let solicitud = load_view(&state, sca_id).await?;
    Ok(Json(ModificacionResponse {
        mensaje: "Solicitud modificada correctamente.",
        solicitud,
        cambios: descripciones,
    })
    .into_response())
}

/// Persist the planned changes and return their descriptions.
async fn modify_in_tx(
    state: &AppState,
    user_id: DbId,
    sca_id: DbId,
    requested: &CambiosSolicitados,
    mut cambios: Vec<Cambio>,
    archivos: &[UploadedFile],
    staged: &mut Vec<String>,
) -> AppResult<Vec<String>> {
    let mut update = UpdateSolicitudAyuda {
        sca_usuario_actualizacion: Some(user_id),
        ..Default::default()
    };
    for cambio in &cambios {
        match cambio {
            Cambio::Titulo { .. } => update.sca_titulo = requested.titulo.clone(),
            Cambio::Descripcion => update.sca_descripcion = requested.descripcion.clone(),
            Cambio::Estado { .. } => update.est_id = requested.est_id,
            Cambio::Documentos { .. } => {}
        }
    }

    let paths = stage_files(state, staged, sca_id, archivos).await?;

    // Report the names actually stored, which may carry a uniqueness suffix.
    for cambio in &mut cambios {
        if let Cambio::Documentos { nombres } = cambio {
            *nombres = paths.iter().map(|p| file_name_of(p).to_string()).collect();
        }
    }

    let mut tx = state.pool.begin().await?;

    SolicitudRepo::update(&mut *tx, sca_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;

    let entrada = BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id,
            bsca_observacion: compose_observation(&cambios),
            usuario_id: Some(user_id),
            bsca_usuario_actualizacion: Some(user_id),
        },
    )
    .await?;

    insert_documents(&mut *tx, sca_id, Some(entrada.bsca_id), &paths, user_id).await?;

    tx.commit().await?;
    Ok(cambios.iter().map(Cambio::describe).collect())
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// POST /solicitudes/filtrar
///
/// Lists requests matching every supplied predicate, newest first. Documents
/// are loaded with one query over the whole result set.
pub async fn filter(
    State(state): State<AppState>,
    _auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<Vec<SolicitudView>>> {
    let filter = SolicitudFilter::parse(
        form.text("estado_id"),
        form.text("year"),
        form.text("month"),
        form.text("day"),
        form.text("solicitante_id"),
    )?;

    let solicitudes =
        SolicitudRepo::list_filtered(&state.pool, &filter, &state.config.time_zone).await?;
    let ids: Vec<DbId> = solicitudes.iter().map(|s| s.sca_id).collect();
    let documentos = if ids.is_empty() {
        Vec::new()
    } else {
        DocumentoRepo::list_by_solicitudes(&state.pool, &ids).await?
    };

    Ok(Json(solicitud_views(solicitudes, &documentos, &state.config)))
}

// ---------------------------------------------------------------------------
// Annul
// ---------------------------------------------------------------------------

/// POST /solicitudes/anular
///
/// Moves the request to the configured annulled status and logs the reason.
/// Annulling an already annulled request changes nothing.
pub async fn annul(
    State(state): State<AppState>,
    auth: AuthUser,
    form: RequestForm,
) -> AppResult<Response> {
    let sca_id = form.required_id("sca_id", MSG_SCA_ID_REQUIRED)?;
    let annulled_id = state.config.annulled_status_id;

    let solicitud = SolicitudRepo::find_by_id(&state.pool, sca_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;

    EstadoRepo::find_by_id(&state.pool, annulled_id)
        .await?
        .ok_or_else(|| AppError::Internal {
            message: MSG_ANNULLED_MISSING.to_string(),
            detail: Some(format!("est_id {annulled_id} no existe")),
        })?;

    let already = Json(SinCambiosResponse {
        mensaje: MSG_ALREADY_ANNULLED,
        sca_id,
    });
    if solicitud.est_id == annulled_id {
        return Ok(already.into_response());
    }

    let mut tx = state.pool.begin().await?;

    // Conditional update: a concurrent annulment leaves nothing to do here.
    if !SolicitudRepo::transition(&mut *tx, sca_id, annulled_id, auth.user_id).await? {
        return Ok(already.into_response());
    }

    BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id,
            bsca_observacion: annulment_observation(form.text("motivo")),
            usuario_id: Some(auth.user_id),
            bsca_usuario_actualizacion: Some(auth.user_id),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, sca_id, "Solicitud annulled");

    let solicitud = load_view(&state, sca_id).await?;
    Ok(Json(SolicitudResponse {
        mensaje: "Solicitud anulada correctamente.",
        solicitud,
    })
    .into_response())
}
