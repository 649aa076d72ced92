use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Raised when an incoming timestamp cannot be read as an instant.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TimestampError {
    #[error("timestamp must not be empty")]
    Empty,
    #[error("invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS[.fff]]")]
    Malformed(String),
}

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Parses a client timestamp into a UTC wall-clock value.
///
/// Values carrying an offset are converted to UTC. Values without one are
/// taken as UTC as-is; no local zone is ever assumed.
pub(crate) fn parse_utc(raw: &str) -> Result<PrimitiveDateTime, TimestampError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::Empty);
    }

    let normalized = match trimmed.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &trimmed[..10], &trimmed[11..]),
        _ => trimmed.to_string(),
    };

    if let Ok(value) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(to_primitive_utc(value));
    }

    let naive = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(&normalized, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    });

    naive.map_err(|_| TimestampError::Malformed(trimmed.to_string()))
}
