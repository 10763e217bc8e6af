//! Bearer-token authentication for request handlers.
//!
//! A token is accepted only when its signature and expiry are valid and its
//! subject is an existing, active user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use solicitudes_core::error::CoreError;
use solicitudes_core::types::DbId;
use solicitudes_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

pub const MSG_CREDENTIALS_MISSING: &str = "Las credenciales de autenticación no se proveyeron.";
pub const MSG_BAD_SCHEME: &str = "Formato de autorización inválido. Se esperaba: Bearer <token>";
pub const MSG_INVALID_TOKEN: &str = "Token inválido o expirado.";
pub const MSG_USER_INACTIVE: &str = "Usuario inactivo o eliminado.";

/// Acting user of a request, taken from the `Authorization: Bearer` header.
///
/// Handlers record `user_id` as author and editor of the rows they write.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized(MSG_CREDENTIALS_MISSING))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized(MSG_BAD_SCHEME))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized(MSG_INVALID_TOKEN))?;

        match UserRepo::find_by_id(&state.pool, claims.sub).await? {
            Some(user) if user.is_active => Ok(AuthUser { user_id: user.id }),
            _ => {
                tracing::debug!(user_id = claims.sub, "Token subject is inactive or missing");
                Err(unauthorized(MSG_USER_INACTIVE))
            }
        }
    }
}
