//! Parsing helpers for loosely typed form values.
//!
//! Clients send fields either as JSON or as multipart text parts, so every
//! value reaches the domain as an optional string. Absent, empty and
//! whitespace-only values are all treated as "not supplied".

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::DbId;

/// Return the value only if it carries non-whitespace content.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a positive integer id from a form field.
pub fn parse_id(field: &str, raw: &str) -> Result<DbId, CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::Validation(format!(
            "El campo '{field}' debe ser un número entero positivo."
        ))),
    }
}

/// Parse an optional id: missing values yield `None`, malformed ones an error.
pub fn parse_optional_id(field: &str, raw: Option<&str>) -> Result<Option<DbId>, CoreError> {
    present(raw).map(|v| parse_id(field, v)).transpose()
}

/// Parse an integer constrained to `min..=max`.
pub fn parse_int_in_range(field: &str, raw: &str, min: i32, max: i32) -> Result<i32, CoreError> {
    match raw.trim().parse::<i32>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(CoreError::Validation(format!(
            "El campo '{field}' debe ser un número entre {min} y {max}."
        ))),
    }
}

/// Parse a boolean flag. Accepts `true`/`false`, `1`/`0`, `si`/`no`.
pub fn parse_bool(field: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "si" | "sí" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CoreError::Validation(format!(
            "El campo '{field}' debe ser verdadero o falso."
        ))),
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!(
            "El campo '{field}' debe tener el formato AAAA-MM-DD."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn blank_values_are_not_present() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some("")), None);
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(Some(" x ")), Some(" x "));
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("est_id", " 7 ").unwrap(), 7);
        assert_matches!(parse_id("est_id", "0"), Err(CoreError::Validation(_)));
        assert_matches!(parse_id("est_id", "-3"), Err(CoreError::Validation(_)));
        assert_matches!(parse_id("est_id", "abc"), Err(CoreError::Validation(msg)) if msg.contains("est_id"));
    }

    #[test]
    fn optional_id_skips_blank() {
        assert_eq!(parse_optional_id("id", Some("")).unwrap(), None);
        assert_eq!(parse_optional_id("id", Some("12")).unwrap(), Some(12));
        assert!(parse_optional_id("id", Some("x")).is_err());
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(parse_int_in_range("month", "1", 1, 12).unwrap(), 1);
        assert_eq!(parse_int_in_range("month", "12", 1, 12).unwrap(), 12);
        assert!(parse_int_in_range("month", "13", 1, 12).is_err());
    }

    #[test]
    fn bools_and_dates() {
        assert!(parse_bool("solo_vigentes", "True").unwrap());
        assert!(!parse_bool("solo_vigentes", "0").unwrap());
        assert!(parse_bool("solo_vigentes", "maybe").is_err());

        let date = parse_date("fecha_nacimiento", "1990-05-17").unwrap();
        assert_eq!(date.to_string(), "1990-05-17");
        assert!(parse_date("fecha_nacimiento", "17/05/1990").is_err());
    }
}
