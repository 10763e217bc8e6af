//! Audit-log (bitácora) rules.

use crate::error::CoreError;
use crate::forms::{parse_id, present};
use crate::types::DbId;

/// Observation recorded when a request is created.
pub const CREATION_OBSERVATION: &str = "";

/// Shown in place of the author once the user row is gone.
pub const DELETED_USER_LABEL: &str = "Usuario eliminado";

/// Multipart field carrying the optional attachment of a log entry.
pub const ATTACHMENT_FIELD: &str = "doc_archivo";

pub const MSG_ENTRY_REQUIRED: &str =
    "Los campos 'solicitud_id' y 'bsca_observacion' son obligatorios.";
pub const MSG_SOLICITUD_ID_REQUIRED: &str = "El campo 'solicitud_id' es obligatorio.";

/// Validated fields for a manual log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevaEntrada {
    pub sca_id: DbId,
    pub observacion: String,
}

impl NuevaEntrada {
    pub fn parse(solicitud_id: Option<&str>, observacion: Option<&str>) -> Result<Self, CoreError> {
        let (Some(solicitud_id), Some(observacion)) = (present(solicitud_id), present(observacion))
        else {
            return Err(CoreError::Validation(MSG_ENTRY_REQUIRED.into()));
        };
        Ok(Self {
            sca_id: parse_id("solicitud_id", solicitud_id)?,
            observacion: observacion.trim().to_string(),
        })
    }
}

/// Parse the request id used to list a request's log.
pub fn parse_solicitud_id(raw: Option<&str>) -> Result<DbId, CoreError> {
    let raw = present(raw).ok_or_else(|| CoreError::Validation(MSG_SOLICITUD_ID_REQUIRED.into()))?;
    parse_id("solicitud_id", raw)
}

/// Observation appended when a document is removed from a request.
pub fn document_deleted_observation(file_name: &str) -> String {
    format!("Se eliminó el documento '{file_name}'.")
}

/// Author label for a log entry whose user may have been deleted.
pub fn author_label(email: Option<&str>) -> String {
    email.unwrap_or(DELETED_USER_LABEL).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn entry_requires_request_and_observation() {
        assert_matches!(
            NuevaEntrada::parse(Some("4"), None),
            Err(CoreError::Validation(msg)) if msg == MSG_ENTRY_REQUIRED
        );
        assert_matches!(NuevaEntrada::parse(None, Some("hola")), Err(_));

        let entrada = NuevaEntrada::parse(Some("4"), Some(" Visita realizada ")).unwrap();
        assert_eq!(entrada.sca_id, 4);
        assert_eq!(entrada.observacion, "Visita realizada");
    }

    #[test]
    fn listing_requires_request_id() {
        assert_matches!(
            parse_solicitud_id(None),
            Err(CoreError::Validation(msg)) if msg == MSG_SOLICITUD_ID_REQUIRED
        );
        assert_eq!(parse_solicitud_id(Some("9")).unwrap(), 9);
    }

    #[test]
    fn labels() {
        assert_eq!(
            document_deleted_observation("plano.pdf"),
            "Se eliminó el documento 'plano.pdf'."
        );
        assert_eq!(author_label(None), "Usuario eliminado");
        assert_eq!(author_label(Some("a@b.cl")), "a@b.cl");
    }
}
