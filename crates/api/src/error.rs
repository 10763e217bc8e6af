use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use solicitudes_core::error::CoreError;
use solicitudes_core::storage::StorageError;

/// Generic message returned with every 500 response.
pub const MSG_INTERNAL: &str = "Ocurrió un error inesperado.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"error": ..., "code": ..., "detalle": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `solicitudes_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A malformed multipart body.
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource with a human-readable message.
    #[error("Not found: {0}")]
    NotFoundMessage(String),

    /// An internal error with a public message and the underlying cause.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for a 404 carrying `message`.
    pub fn not_found(message: &str) -> Self {
        AppError::NotFoundMessage(message.to_string())
    }

    /// Shorthand for a 400 carrying a domain validation `message`.
    pub fn validation(message: &str) -> Self {
        AppError::Core(CoreError::Validation(message.to_string()))
    }

    /// Re-label any error as a 500 with `message`, keeping its text as detail.
    pub fn internal(message: &str, source: impl std::fmt::Display) -> Self {
        AppError::Internal {
            message: message.to_string(),
            detail: Some(source.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} con id {id} no existe."),
                    None,
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal(MSG_INTERNAL, Some(msg.clone()))
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Storage errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                internal(MSG_INTERNAL, Some(err.to_string()))
            }

            // --- HTTP-specific errors ---
            AppError::Multipart(err) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("Formulario multipart inválido: {}", err.body_text()),
                None,
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::NotFoundMessage(msg) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
            }
            AppError::Internal { message, detail } => {
                tracing::error!(error = %message, detail = ?detail, "Internal error");
                internal(message, detail.clone())
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(detail) = detail {
            body["detalle"] = json!(detail);
        }

        (status, axum::Json(body)).into_response()
    }
}

type Classified = (StatusCode, &'static str, String, Option<String>);

fn internal(message: &str, detail: Option<String>) -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        message.to_string(),
        detail,
    )
}

/// Classify a sqlx error into an HTTP status, error code, message and detail.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations map to 400.
/// - Everything else maps to 500 with the driver message as detail.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "El recurso solicitado no existe.".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    if constraint.starts_with("uq_") {
                        return (
                            StatusCode::CONFLICT,
                            "CONFLICT",
                            format!("El valor ya existe (restricción {constraint})."),
                            None,
                        );
                    }
                }
                // PostgreSQL foreign key violation
                Some("23503") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "BAD_REQUEST",
                        "La referencia indicada no existe o está en uso.".to_string(),
                        None,
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            internal(MSG_INTERNAL, Some(db_err.to_string()))
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal(MSG_INTERNAL, Some(other.to_string()))
        }
    }
}
