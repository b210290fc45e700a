//! Request normalization shared by the route handlers.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Trimmed, non-empty text or a validation error naming `field`.
pub fn required_text(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Blank strings become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn due_date(value: Option<String>) -> ApiResult<Option<String>> {
    match optional_text(value) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| ApiError::validation(format!("invalid due_date '{}', expected YYYY-MM-DD", s))),
    }
}

pub fn due_time(value: Option<String>) -> ApiResult<Option<String>> {
    match optional_text(value) {
        None => Ok(None),
        Some(s) => {
            let valid = NaiveTime::parse_from_str(&s, "%H:%M").is_ok()
                || NaiveTime::parse_from_str(&s, "%H:%M:%S").is_ok();
            if valid {
                Ok(Some(s))
            } else {
                Err(ApiError::validation(format!(
                    "invalid due_time '{}', expected HH:MM",
                    s
                )))
            }
        }
    }
}

/// Normalize a reminder timestamp to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM[:SS]`
/// (or space-separated) value which is read as server local time.
pub fn reminder_at(value: Option<String>) -> ApiResult<Option<String>> {
    let Some(s) = optional_text(value) else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(to_utc_string(dt.with_timezone(&Utc))));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(Some(to_utc_string(local.with_timezone(&Utc))));
            }
        }
    }
    Err(ApiError::validation(format!("invalid reminder_at '{}'", s)))
}

/// Reminder comparison key for "now".
pub fn reminder_now() -> String {
    to_utc_string(Utc::now())
}

fn to_utc_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse the `completed` query parameter.
pub fn completed_flag(value: Option<&str>) -> ApiResult<Option<bool>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(ApiError::validation(format!(
            "invalid completed filter '{}', expected true or false",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  hi ", "title").unwrap(), "hi");
        let err = required_text("   ", "title").unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_due_fields() {
        assert_eq!(due_date(Some("2024-01-01".into())).unwrap().as_deref(), Some("2024-01-01"));
        assert_eq!(due_date(Some("".into())).unwrap(), None);
        assert!(due_date(Some("01/02/2024".into())).is_err());

        assert_eq!(due_time(Some("09:30".into())).unwrap().as_deref(), Some("09:30"));
        assert_eq!(due_time(Some("09:30:15".into())).unwrap().as_deref(), Some("09:30:15"));
        assert!(due_time(Some("25:00".into())).is_err());
    }

    #[test]
    fn test_reminder_at_normalizes_to_utc() {
        assert_eq!(
            reminder_at(Some("2024-01-01T09:00:00+08:00".into())).unwrap().as_deref(),
            Some("2024-01-01T01:00:00Z")
        );
        assert_eq!(
            reminder_at(Some("2024-01-01T09:00:00.123Z".into())).unwrap().as_deref(),
            Some("2024-01-01T09:00:00Z")
        );
        let local = reminder_at(Some("2024-01-01T09:00".into())).unwrap().unwrap();
        assert!(local.ends_with('Z'));
        assert!(reminder_at(Some("tomorrow".into())).is_err());
        assert_eq!(reminder_at(None).unwrap(), None);
    }

    #[test]
    fn test_completed_flag() {
        assert_eq!(completed_flag(Some("true")).unwrap(), Some(true));
        assert_eq!(completed_flag(Some("0")).unwrap(), Some(false));
        assert_eq!(completed_flag(None).unwrap(), None);
        assert!(completed_flag(Some("yes")).is_err());
    }
}
