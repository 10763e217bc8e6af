//! Conjunctive filters for listing requests.

use crate::error::CoreError;
use crate::forms::{parse_int_in_range, parse_optional_id, present};
use crate::types::DbId;

/// Earliest creation year accepted in a filter.
const MIN_YEAR: i32 = 1900;
/// Latest creation year accepted in a filter.
const MAX_YEAR: i32 = 9999;

/// Every supplied predicate must hold for a request to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolicitudFilter {
    pub estado_id: Option<DbId>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub solicitante_id: Option<DbId>,
}

impl SolicitudFilter {
    pub fn parse(
        estado_id: Option<&str>,
        year: Option<&str>,
        month: Option<&str>,
        day: Option<&str>,
        solicitante_id: Option<&str>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            estado_id: parse_optional_id("estado_id", estado_id)?,
            year: present(year)
                .map(|v| parse_int_in_range("year", v, MIN_YEAR, MAX_YEAR))
                .transpose()?,
            month: present(month)
                .map(|v| parse_int_in_range("month", v, 1, 12))
                .transpose()?,
            day: present(day)
                .map(|v| parse_int_in_range("day", v, 1, 31))
                .transpose()?,
            solicitante_id: parse_optional_id("solicitante_id", solicitante_id)?,
        })
    }
}
