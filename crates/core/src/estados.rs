//! Request status catalogue rules.

use crate::error::CoreError;
use crate::forms::present;

/// Maximum length of a status name.
pub const MAX_NOMBRE_LENGTH: usize = 80;

pub const MSG_NOMBRE_REQUIRED: &str = "El campo 'nombre_estado' es obligatorio.";

/// Validate and trim a new status name.
pub fn validate_nombre(raw: Option<&str>) -> Result<String, CoreError> {
    let nombre = present(raw)
        .ok_or_else(|| CoreError::Validation(MSG_NOMBRE_REQUIRED.into()))?
        .trim();

    if nombre.chars().count() > MAX_NOMBRE_LENGTH {
        return Err(CoreError::Validation(format!(
            "El campo 'nombre_estado' no puede superar {MAX_NOMBRE_LENGTH} caracteres."
        )));
    }
    Ok(nombre.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required_and_bounded() {
        assert!(validate_nombre(None).is_err());
        assert!(validate_nombre(Some("   ")).is_err());
        assert!(validate_nombre(Some(&"e".repeat(MAX_NOMBRE_LENGTH + 1))).is_err());
        assert_eq!(validate_nombre(Some(" En revisión ")).unwrap(), "En revisión");
    }
}
