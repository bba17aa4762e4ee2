// File: ./src/timezone.rs
// IANA zone resolution and local <-> UTC conversion for event dates.
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::env;
use thiserror::Error;

/// Format accepted for local date-time input (`2025-03-01T09:30`).
pub const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimezoneError {
    #[error("Unknown timezone '{0}'")]
    Unknown(String),
    #[error("Invalid date-time '{0}', expected YYYY-MM-DDTHH:MM")]
    BadInput(String),
    #[error("{local} does not exist in {zone} (clock change)")]
    Skipped { local: NaiveDateTime, zone: Tz },
}

pub fn parse_zone(name: &str) -> Result<Tz, TimezoneError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimezoneError::Unknown(name.to_string()))
}

/// Picks the zone for outgoing requests: explicit setting, then `TZ`,
/// then UTC. An invalid `TZ` is ignored; an invalid setting is an error.
pub fn resolve_zone(configured: Option<&str>) -> Result<Tz, TimezoneError> {
    if let Some(name) = configured.filter(|n| !n.trim().is_empty()) {
        return parse_zone(name);
    }
    if let Ok(name) = env::var("TZ")
        && let Ok(tz) = parse_zone(name.trim_start_matches(':'))
    {
        return Ok(tz);
    }
    Ok(Tz::UTC)
}

pub fn parse_local_input(input: &str) -> Result<NaiveDateTime, TimezoneError> {
    NaiveDateTime::parse_from_str(input.trim(), LOCAL_INPUT_FORMAT)
        .map_err(|_| TimezoneError::BadInput(input.to_string()))
}

/// Parses `YYYY-MM-DDTHH:MM` input and reads it as a wall-clock time in `zone`.
pub fn local_input_to_utc(input: &str, zone: Tz) -> Result<DateTime<Utc>, TimezoneError> {
    local_to_utc(parse_local_input(input)?, zone)
}

/// Interprets a wall-clock time in `zone`. Ambiguous times (clocks going
/// back) resolve to the earlier instant.
pub fn local_to_utc(local: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>, TimezoneError> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimezoneError::Skipped { local, zone }),
    }
}

pub fn utc_to_local(instant: DateTime<Utc>, zone: Tz) -> NaiveDateTime {
    instant.with_timezone(&zone).naive_local()
}

/// Human rendering: the server's local string when present, otherwise
/// the UTC instant shown in `zone`.
pub fn display_date(instant: DateTime<Utc>, server_local: Option<&str>, zone: Tz) -> String {
    if let Some(local) = server_local
        && let Ok(parsed) = DateTime::parse_from_rfc3339(local)
    {
        return parsed.format("%Y-%m-%d %H:%M %:z").to_string();
    }
    instant
        .with_timezone(&zone)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}
