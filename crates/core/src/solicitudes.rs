//! Help-request rules: required fields, change summaries and annulment.

use crate::error::CoreError;
use crate::forms::{parse_id, present};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a request title in characters.
pub const MAX_TITULO_LENGTH: usize = 200;

/// Status id used for annulled requests when none is configured.
pub const DEFAULT_ANNULLED_STATUS_ID: DbId = 5;

/// Multipart field carrying documents on create/modify.
pub const DOCUMENTS_FIELD: &str = "documentos_data";

pub const MSG_CREATE_REQUIRED: &str =
    "Los campos 'sca_titulo', 'sca_descripcion' y 'est_id' son obligatorios.";
pub const MSG_MODIFY_NOTHING: &str = "Debe indicar al menos un campo a modificar: \
     'sca_titulo', 'sca_descripcion', 'est_id' o 'documentos_data'.";
pub const MSG_ESTADO_NOT_FOUND: &str = "El estado de solicitud especificado no existe.";
pub const MSG_SOLICITUD_NOT_FOUND: &str = "La solicitud especificada no existe.";
pub const MSG_ANNULLED_MISSING: &str = "El estado de anulación no está configurado.";
pub const MSG_ALREADY_ANNULLED: &str = "La solicitud ya se encuentra anulada.";
pub const MSG_NO_CHANGES: &str = "La solicitud no presenta cambios.";
pub const MSG_SCA_ID_REQUIRED: &str = "El campo 'sca_id' es obligatorio.";

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Validated fields for a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevaSolicitud {
    pub titulo: String,
    pub descripcion: String,
    pub est_id: DbId,
}

impl NuevaSolicitud {
    /// Validate the raw create fields. All three are required.
    pub fn parse(
        titulo: Option<&str>,
        descripcion: Option<&str>,
        est_id: Option<&str>,
    ) -> Result<Self, CoreError> {
        let (Some(titulo), Some(descripcion), Some(est_id)) =
            (present(titulo), present(descripcion), present(est_id))
        else {
            return Err(CoreError::Validation(MSG_CREATE_REQUIRED.into()));
        };

        let titulo = validate_titulo(titulo)?;
        let est_id = parse_id("est_id", est_id)?;

        Ok(Self {
            titulo,
            descripcion: descripcion.trim().to_string(),
            est_id,
        })
    }
}

/// Trim a title and enforce the column length.
pub fn validate_titulo(titulo: &str) -> Result<String, CoreError> {
    let titulo = titulo.trim();
    if titulo.chars().count() > MAX_TITULO_LENGTH {
        return Err(CoreError::Validation(format!(
            "El campo 'sca_titulo' no puede superar {MAX_TITULO_LENGTH} caracteres."
        )));
    }
    Ok(titulo.to_string())
}

// ---------------------------------------------------------------------------
// Modify
// ---------------------------------------------------------------------------

/// Fields a caller asked to change. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CambiosSolicitados {
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    pub est_id: Option<DbId>,
    pub documentos: Vec<String>,
}

impl CambiosSolicitados {
    /// Validate raw modify fields. At least one field or one document is required.
    pub fn parse(
        titulo: Option<&str>,
        descripcion: Option<&str>,
        est_id: Option<&str>,
        documentos: Vec<String>,
    ) -> Result<Self, CoreError> {
        let titulo = present(titulo).map(validate_titulo).transpose()?;
        let descripcion = present(descripcion).map(|d| d.trim().to_string());
        let est_id = present(est_id).map(|v| parse_id("est_id", v)).transpose()?;

        let requested = Self {
            titulo,
            descripcion,
            est_id,
            documentos,
        };
        if requested.is_empty() {
            return Err(CoreError::Validation(MSG_MODIFY_NOTHING.into()));
        }
        Ok(requested)
    }

    pub fn is_empty(&self) -> bool {
        self.titulo.is_none()
            && self.descripcion.is_none()
            && self.est_id.is_none()
            && self.documentos.is_empty()
    }
}

/// A single change applied to a request, as recorded in its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cambio {
    Titulo { anterior: String, nuevo: String },
    Descripcion,
    Estado { anterior: String, nuevo: String },
    Documentos { nombres: Vec<String> },
}

impl Cambio {
    /// One-sentence description for the log entry.
    pub fn describe(&self) -> String {
        match self {
            Cambio::Titulo { anterior, nuevo } => {
                format!("Título modificado de '{anterior}' a '{nuevo}'.")
            }
            Cambio::Descripcion => "Descripción modificada.".to_string(),
            Cambio::Estado { anterior, nuevo } => {
                format!("Estado modificado de '{anterior}' a '{nuevo}'.")
            }
            Cambio::Documentos { nombres } => format!(
                "Se adjuntaron {} documento(s): {}.",
                nombres.len(),
                nombres.join(", ")
            ),
        }
    }
}

/// Snapshot of the values a modification is compared against.
#[derive(Debug, Clone)]
pub struct EstadoActual<'a> {
    pub titulo: &'a str,
    pub descripcion: &'a str,
    pub est_id: DbId,
    pub estado_nombre: &'a str,
}

/// Compute the effective changes. Supplied values equal to the stored ones
/// are dropped. `nuevo_estado_nombre` is the resolved name of `requested.est_id`.
pub fn plan_changes(
    actual: &EstadoActual<'_>,
    requested: &CambiosSolicitados,
    nuevo_estado_nombre: Option<&str>,
) -> Vec<Cambio> {
    let mut cambios = Vec::new();

    if let Some(titulo) = requested.titulo.as_deref() {
        if titulo != actual.titulo {
            cambios.push(Cambio::Titulo {
                anterior: actual.titulo.to_string(),
                nuevo: titulo.to_string(),
            });
        }
    }

    if let Some(descripcion) = requested.descripcion.as_deref() {
        if descripcion != actual.descripcion {
            cambios.push(Cambio::Descripcion);
        }
    }

    if let (Some(est_id), Some(nombre)) = (requested.est_id, nuevo_estado_nombre) {
        if est_id != actual.est_id {
            cambios.push(Cambio::Estado {
                anterior: actual.estado_nombre.to_string(),
                nuevo: nombre.to_string(),
            });
        }
    }

    if !requested.documentos.is_empty() {
        cambios.push(Cambio::Documentos {
            nombres: requested.documentos.clone(),
        });
    }

    cambios
}

/// Join change descriptions into the composite log observation.
pub fn compose_observation(cambios: &[Cambio]) -> String {
    cambios
        .iter()
        .map(Cambio::describe)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Annul
// ---------------------------------------------------------------------------

/// Log observation for an annulment, with the optional reason appended.
pub fn annulment_observation(motivo: Option<&str>) -> String {
    match present(motivo) {
        Some(motivo) => format!("Solicitud anulada. Motivo: {}", motivo.trim()),
        None => "Solicitud anulada.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn actual() -> EstadoActual<'static> {
        EstadoActual {
            titulo: "Techo dañado",
            descripcion: "Gotea agua",
            est_id: 1,
            estado_nombre: "Ingresada",
        }
    }

    #[test]
    fn create_requires_all_three_fields() {
        let err = NuevaSolicitud::parse(Some("Techo"), None, Some("1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == MSG_CREATE_REQUIRED);

        let err = NuevaSolicitud::parse(Some(" "), Some("x"), Some("1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn create_parses_and_trims() {
        let nueva =
            NuevaSolicitud::parse(Some(" Techo dañado "), Some("Gotea agua"), Some("1")).unwrap();
        assert_eq!(nueva.titulo, "Techo dañado");
        assert_eq!(nueva.est_id, 1);
    }

    #[test]
    fn create_rejects_bad_status_id_and_long_title() {
        assert!(NuevaSolicitud::parse(Some("a"), Some("b"), Some("uno")).is_err());
        let long = "x".repeat(MAX_TITULO_LENGTH + 1);
        assert!(NuevaSolicitud::parse(Some(&long), Some("b"), Some("1")).is_err());
    }

    #[test]
    fn modify_with_nothing_is_rejected() {
        let err = CambiosSolicitados::parse(None, Some(""), None, vec![]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == MSG_MODIFY_NOTHING);
    }

    #[test]
    fn modify_with_only_documents_is_accepted() {
        let requested =
            CambiosSolicitados::parse(None, None, None, vec!["foto.png".into()]).unwrap();
        assert!(!requested.is_empty());
    }

    #[test]
    fn plan_skips_unchanged_values() {
        let requested = CambiosSolicitados {
            titulo: Some("Techo dañado".into()),
            descripcion: Some("Gotea agua".into()),
            est_id: Some(1),
            documentos: vec![],
        };
        assert!(plan_changes(&actual(), &requested, Some("Ingresada")).is_empty());
    }

    #[test]
    fn plan_records_every_effective_change_in_order() {
        let requested = CambiosSolicitados {
            titulo: Some("Techo reparado".into()),
            descripcion: Some("Ya no gotea".into()),
            est_id: Some(3),
            documentos: vec!["a.pdf".into(), "b.png".into()],
        };
        let cambios = plan_changes(&actual(), &requested, Some("En proceso"));
        assert_eq!(cambios.len(), 4);

        let observation = compose_observation(&cambios);
        assert_eq!(
            observation,
            "Título modificado de 'Techo dañado' a 'Techo reparado'. \
             Descripción modificada. \
             Estado modificado de 'Ingresada' a 'En proceso'. \
             Se adjuntaron 2 documento(s): a.pdf, b.png."
        );
    }

    #[test]
    fn annulment_observation_includes_reason() {
        assert_eq!(annulment_observation(None), "Solicitud anulada.");
        assert_eq!(annulment_observation(Some("  ")), "Solicitud anulada.");
        assert_eq!(
            annulment_observation(Some("Duplicada")),
            "Solicitud anulada. Motivo: Duplicada"
        );
    }
}
