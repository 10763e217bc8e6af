use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{bitacora, documento, estado, solicitud, usuario};
use crate::state::AppState;

/// Build the `/solicitudes` route tree. Every route requires a bearer token.
///
/// Route hierarchy:
///
/// ```text
/// /crear                              create request (multipart or JSON)
/// /modificar                          modify request
/// /filtrar                            list requests by status/date/applicant
/// /anular                             annul request
///
/// /bitacora/crear                     append log entry
/// /bitacora/filtrar                   list a request's log
///
/// /estado/crear                       create status
/// /estado/filtrar                     list statuses
///
/// /documento/{doc_id}                 stream document (GET)
/// /documento/eliminar                 delete document
///
/// /tipo/crear                         create user type
/// /tipo/ver                           list user types
/// /tipo/usuario                       assign type to user
///
/// /usuario/lista                      list users by id/rut
/// /usuario/modificar                  modify user profile
/// /usuario/desactivar_usuario         deactivate user
/// /usuario/activar_usuario            activate user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/crear", post(solicitud::create))
        .route("/modificar", post(solicitud::modify))
        .route("/filtrar", post(solicitud::filter))
        .route("/anular", post(solicitud::annul))
        .route("/bitacora/crear", post(bitacora::create))
        .route("/bitacora/filtrar", post(bitacora::filter))
        .route("/estado/crear", post(estado::create))
        .route("/estado/filtrar", post(estado::list))
        .route("/documento/eliminar", post(documento::delete))
        .route("/documento/{doc_id}", get(documento::fetch))
        .route("/tipo/crear", post(usuario::create_tipo))
        .route("/tipo/ver", post(usuario::list_tipos))
        .route("/tipo/usuario", post(usuario::assign_tipo))
        .route("/usuario/lista", post(usuario::list))
        .route("/usuario/modificar", post(usuario::modify))
        .route("/usuario/desactivar_usuario", post(usuario::deactivate))
        .route("/usuario/activar_usuario", post(usuario::activate))
}
