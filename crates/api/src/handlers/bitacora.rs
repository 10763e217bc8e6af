//! Handlers for request audit logs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use solicitudes_core::bitacora::{parse_solicitud_id, NuevaEntrada, ATTACHMENT_FIELD};
use solicitudes_core::solicitudes::MSG_SOLICITUD_NOT_FOUND;
use solicitudes_core::types::DbId;
use solicitudes_db::models::bitacora::CreateBitacoraSolicitud;
use solicitudes_db::repositories::{BitacoraRepo, DocumentoRepo, SolicitudRepo};

use super::{discard_on_error, insert_documents, stage_files};
use crate::error::{AppError, AppResult};
use crate::form::{RequestForm, UploadedFile};
use crate::middleware::auth::AuthUser;
use crate::response::{bitacora_views, BitacoraView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BitacoraResponse {
    pub mensaje: &'static str,
    pub bitacora: BitacoraView,
}

/// POST /solicitudes/bitacora/crear
///
/// Appends a manual entry, optionally with one `doc_archivo` attachment
/// linked to both the request and the entry.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    mut form: RequestForm,
) -> AppResult<(StatusCode, Json<BitacoraResponse>)> {
    let entrada = NuevaEntrada::parse(form.text("solicitud_id"), form.text("bsca_observacion"))?;
    let archivo = form.take_file(ATTACHMENT_FIELD);

    SolicitudRepo::find_by_id(&state.pool, entrada.sca_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;

    let mut staged = Vec::new();
    let outcome = create_in_tx(&state, auth.user_id, &entrada, archivo.as_ref(), &mut staged).await;
    let bsca_id = discard_on_error(&state, &staged, outcome).await?;

    tracing::info!(
        user_id = auth.user_id,
        sca_id = entrada.sca_id,
        bsca_id,
        adjunto = archivo.is_some(),
        "Bitacora entry created",
    );

    let detalle = BitacoraRepo::find_detalle(&state.pool, bsca_id)
        .await?
        .ok_or_else(|| AppError::not_found("El registro de bitácora no existe."))?;
    let documentos = DocumentoRepo::list_by_bitacoras(&state.pool, &[bsca_id]).await?;
    let bitacora = bitacora_views(vec![detalle], &documentos, &state.config)
        .pop()
        .ok_or_else(|| AppError::not_found("El registro de bitácora no existe."))?;

    Ok((
        StatusCode::CREATED,
        Json(BitacoraResponse {
            mensaje: "Registro de bitácora creado correctamente.",
            bitacora,
        }),
    ))
}

async fn create_in_tx(
    state: &AppState,
    user_id: DbId,
    entrada: &NuevaEntrada,
    archivo: Option<&UploadedFile>,
    staged: &mut Vec<String>,
) -> AppResult<DbId> {
    let mut tx = state.pool.begin().await?;

    let bitacora = BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id: entrada.sca_id,
            bsca_observacion: entrada.observacion.clone(),
            usuario_id: Some(user_id),
            bsca_usuario_actualizacion: Some(user_id),
        },
    )
    .await?;

    if let Some(archivo) = archivo {
        let paths = stage_files(state, staged, entrada.sca_id, std::slice::from_ref(archivo)).await?;
        insert_documents(&mut *tx, entrada.sca_id, Some(bitacora.bsca_id), &paths, user_id)
            .await?;
    }

    tx.commit().await?;
    Ok(bitacora.bsca_id)
}

/// POST /solicitudes/bitacora/filtrar
///
/// Lists a request's log entries, newest first, with their attachments.
pub async fn filter(
    State(state): State<AppState>,
    _auth: AuthUser,
    form: RequestForm,
) -> AppResult<Json<Vec<BitacoraView>>> {
    let sca_id = parse_solicitud_id(form.text("solicitud_id"))?;

    SolicitudRepo::find_by_id(&state.pool, sca_id)
        .await?
        .ok_or_else(|| AppError::not_found(MSG_SOLICITUD_NOT_FOUND))?;

    let entradas = BitacoraRepo::list_by_solicitud(&state.pool, sca_id).await?;
    let ids: Vec<DbId> = entradas.iter().map(|b| b.bsca_id).collect();
    let documentos = if ids.is_empty() {
        Vec::new()
    } else {
        DocumentoRepo::list_by_bitacoras(&state.pool, &ids).await?
    };

    Ok(Json(bitacora_views(entradas, &documentos, &state.config)))
}
