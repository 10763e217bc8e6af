//! User administration rules: RUT handling, profile validation, user types
//! and activation toggles.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::forms::present;

/// Maximum stored RUT length (`12345678-K`, without dots).
pub const MAX_RUT_LENGTH: usize = 12;

/// Maximum length of a user type name.
pub const MAX_TIPO_NOMBRE_LENGTH: usize = 80;

/// Accepted values of `sexo`; empty means "not specified".
pub const VALID_SEXOS: &[&str] = &["M", "F", "O", ""];

pub const MSG_USUARIO_NOT_FOUND: &str = "El usuario especificado no existe.";
pub const MSG_TIPO_NOT_FOUND: &str = "El tipo de usuario especificado no existe.";
pub const MSG_USUARIO_ID_REQUIRED: &str = "El campo 'usuario_id' es obligatorio.";
pub const MSG_TIPO_REQUIRED: &str = "El campo 'nombre_tipo' es obligatorio.";
pub const MSG_ASSIGN_REQUIRED: &str = "Los campos 'usuario_id' y 'tipo_id' son obligatorios.";
pub const MSG_MODIFY_NOTHING: &str = "Debe indicar al menos un campo a modificar.";

// ---------------------------------------------------------------------------
// RUT
// ---------------------------------------------------------------------------

/// Normalise a RUT to the stored form: no dots, no spaces, upper-case verifier.
pub fn normalize_rut(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .collect::<String>()
        .to_uppercase()
}

/// Compute the modulo-11 verifier digit for the numeric part of a RUT.
pub fn rut_verifier(body: u32) -> char {
    let mut sum = 0;
    let mut factor = 2;
    let mut n = body;
    while n > 0 {
        sum += (n % 10) * factor;
        n /= 10;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

/// Validate a RUT (`body-verifier`) and return its normalised form.
pub fn validate_rut(raw: &str) -> Result<String, CoreError> {
    let rut = normalize_rut(raw);
    let invalid = || CoreError::Validation(format!("El RUT '{raw}' no es válido."));

    if rut.len() > MAX_RUT_LENGTH {
        return Err(invalid());
    }
    let (body, verifier) = rut.split_once('-').ok_or_else(invalid)?;
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let body_num: u32 = body.parse().map_err(|_| invalid())?;

    let mut verifier_chars = verifier.chars();
    match (verifier_chars.next(), verifier_chars.next()) {
        (Some(v), None) if v == rut_verifier(body_num) => Ok(rut),
        _ => Err(invalid()),
    }
}

// ---------------------------------------------------------------------------
// Profile fields
// ---------------------------------------------------------------------------

/// Validate and lower-case an e-mail address.
pub fn validate_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if email.validate_email() {
        Ok(email)
    } else {
        Err(CoreError::Validation(format!(
            "El email '{}' no es válido.",
            raw.trim()
        )))
    }
}

/// Validate the `sexo` choice.
pub fn validate_sexo(raw: &str) -> Result<String, CoreError> {
    let sexo = raw.trim().to_uppercase();
    if VALID_SEXOS.contains(&sexo.as_str()) {
        Ok(sexo)
    } else {
        Err(CoreError::Validation(
            "El campo 'sexo' debe ser 'M', 'F' u 'O'.".into(),
        ))
    }
}

/// Validate a user type name.
pub fn validate_tipo_nombre(raw: Option<&str>) -> Result<String, CoreError> {
    let nombre = present(raw)
        .ok_or_else(|| CoreError::Validation(MSG_TIPO_REQUIRED.into()))?
        .trim();
    if nombre.chars().count() > MAX_TIPO_NOMBRE_LENGTH {
        return Err(CoreError::Validation(format!(
            "El campo 'nombre_tipo' no puede superar {MAX_TIPO_NOMBRE_LENGTH} caracteres."
        )));
    }
    Ok(nombre.to_string())
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// Desired activation state for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activate,
    Deactivate,
}

impl Activation {
    /// Value of `is_active` after the toggle.
    pub fn target(self) -> bool {
        matches!(self, Activation::Activate)
    }

    /// `true` when a user with `is_active = current` needs to be persisted.
    pub fn requires_update(self, current: bool) -> bool {
        current != self.target()
    }

    pub fn already_message(self) -> &'static str {
        match self {
            Activation::Activate => "El usuario ya se encuentra activado.",
            Activation::Deactivate => "El usuario ya se encuentra desactivado.",
        }
    }

    pub fn done_message(self) -> &'static str {
        match self {
            Activation::Activate => "Usuario activado correctamente.",
            Activation::Deactivate => "Usuario desactivado correctamente.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn rut_normalisation() {
        assert_eq!(normalize_rut("12.345.678-k"), "12345678-K");
        assert_eq!(normalize_rut(" 9.876.543-3 "), "9876543-3");
    }

    #[test]
    fn rut_verifier_digits() {
        assert_eq!(rut_verifier(11_111_111), '1');
        assert_eq!(rut_verifier(12_345_678), '5');
        assert_eq!(rut_verifier(6), 'K');
        assert_eq!(rut_verifier(28), '0');
    }

    #[test]
    fn rut_validation() {
        assert_eq!(validate_rut("12.345.678-5").unwrap(), "12345678-5");
        assert_eq!(validate_rut("6-k").unwrap(), "6-K");
        assert_matches!(validate_rut("12345678-9"), Err(CoreError::Validation(_)));
        assert_matches!(validate_rut("123456785"), Err(CoreError::Validation(_)));
        assert_matches!(validate_rut("abc-1"), Err(CoreError::Validation(_)));
        assert_matches!(validate_rut("-1"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn email_and_sexo() {
        assert_eq!(validate_email(" Ana@Techo.CL ").unwrap(), "ana@techo.cl");
        assert!(validate_email("no-es-email").is_err());
        assert_eq!(validate_sexo("f").unwrap(), "F");
        assert_eq!(validate_sexo("").unwrap(), "");
        assert!(validate_sexo("X").is_err());
    }

    #[test]
    fn tipo_nombre() {
        assert_matches!(
            validate_tipo_nombre(Some(" ")),
            Err(CoreError::Validation(msg)) if msg == MSG_TIPO_REQUIRED
        );
        assert_eq!(validate_tipo_nombre(Some(" Voluntario ")).unwrap(), "Voluntario");
    }

    #[test]
    fn activation_is_idempotent() {
        assert!(!Activation::Activate.requires_update(true));
        assert!(Activation::Activate.requires_update(false));
        assert!(!Activation::Deactivate.requires_update(false));
        assert!(Activation::Deactivate.requires_update(true));
        assert_eq!(
            Activation::Deactivate.already_message(),
            "El usuario ya se encuentra desactivado."
        );
    }
}
