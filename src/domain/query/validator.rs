//! Validation of untrusted lookup and listing input.

use crate::domain::error::QueryError;
use crate::domain::query::field::LookupField;
use std::num::NonZeroU64;

/// Upper bound on `len(key) + len(value)`, in bytes.
pub const MAX_LOOKUP_INPUT_LEN: usize = 50;

/// A lookup whose field is allow-listed and whose input is within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub field: LookupField,
    pub value: String,
}

/// Positive cap on the number of listed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLimit(NonZeroU64);

impl ResultLimit {
    pub fn new(n: u64) -> Option<Self> {
        NonZeroU64::new(n).map(ResultLimit)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Checks the field against the allow-list, then the combined length.
///
/// The value is passed through untouched; it only ever reaches the database
/// as a bound parameter.
pub fn validate_lookup(key: &str, value: &str) -> Result<LookupRequest, QueryError> {
    let field: LookupField = key.parse()?;

    let len = key.len() + value.len();
    if len > MAX_LOOKUP_INPUT_LEN {
        return Err(QueryError::InputTooLong {
            len,
            max: MAX_LOOKUP_INPUT_LEN,
        });
    }

    Ok(LookupRequest {
        field,
        value: value.to_string(),
    })
}

/// Parses the optional `top` query parameter. Absent or empty means no limit.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<ResultLimit>, QueryError> {
    let raw = match raw {
        None | Some("") => return Ok(None),
        Some(r) => r,
    };

    raw.parse::<i64>()
        .ok()
        .and_then(|n| u64::try_from(n).ok())
        .and_then(ResultLimit::new)
        .map(Some)
        .ok_or_else(|| QueryError::InvalidLimit(raw.to_string()))
}
