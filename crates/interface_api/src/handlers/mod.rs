//! Request handlers

pub mod credits;
pub mod health;
pub mod imports;
pub mod payments;
pub mod sequences;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path identifier in either the prefixed or the bare UUID form
pub(crate) fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid {} id", raw, entity)))
}
