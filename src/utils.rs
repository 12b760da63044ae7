use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::CinemaError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an optional `YYYY-MM-DD` query value. Empty strings count as absent.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, CinemaError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| CinemaError::invalid(format!("Incorrect date format: {raw}"))),
    }
}

/// Parses a show start time into UTC wall-clock time.
///
/// Naive values and values with a trailing `Z` are taken as UTC already; an
/// explicit offset is converted to UTC.
pub fn parse_start_time(value: &str) -> Result<NaiveDateTime, CinemaError> {
    let raw = value.trim();
    let naive = raw.trim_end_matches(['Z', 'z']);
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(parsed);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.naive_utc())
        .map_err(|_| CinemaError::invalid(format!("Incorrect start time format: {raw}")))
}
