use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{AnalyticsError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a timezone setting into a [`Tz`].
///
/// `"auto"` selects the system timezone (UTC when undetectable); any other
/// value must be a recognised IANA identifier.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    if name.eq_ignore_ascii_case("auto") {
        let detected = get_system_timezone();
        return Ok(detected.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "resolve_timezone: system timezone \"{}\" is not an IANA name, using UTC",
                detected
            );
            Tz::UTC
        }));
    }
    name.parse::<Tz>()
        .map_err(|_| AnalyticsError::InvalidTimezone(name.to_string()))
}

// ── PostedDateParser ──────────────────────────────────────────────────────────

/// Naive date-time layouts, tried in order after the offset-bearing forms.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; the instant is midnight in the reference timezone.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Shortest all-digit cell read as Unix seconds. Shorter digit runs such as
/// `20240315` are compact dates or nothing.
const UNIX_SECONDS_MIN_DIGITS: usize = 10;

/// Parses raw `posted_date` cells into UTC instants and buckets instants into
/// calendar dates, both against one reference timezone.
///
/// Strings carrying an offset are converted; naive strings are read as
/// wall-clock time in the reference zone. Every instant is therefore
/// comparable with every other regardless of how it was written.
#[derive(Debug, Clone, Copy)]
pub struct PostedDateParser {
    reference: Tz,
}

impl Default for PostedDateParser {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl PostedDateParser {
    pub fn new(reference: Tz) -> Self {
        Self { reference }
    }

    /// Build a parser from a timezone setting (see [`resolve_timezone`]).
    pub fn from_setting(name: &str) -> Result<Self> {
        resolve_timezone(name).map(Self::new)
    }

    pub fn reference(&self) -> Tz {
        self.reference
    }

    /// Parse a raw cell. Returns `None` for empty or unrecognised input.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if s.len() >= UNIX_SECONDS_MIN_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localize(&naive);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return self.localize(&date.and_hms_opt(0, 0, 0)?);
            }
        }
        None
    }

    /// Calendar date of `instant` in the reference timezone.
    pub fn calendar_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.reference).date_naive()
    }

    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        // A wall-clock time skipped by a DST jump has no instant.
        self.reference
            .from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // ── resolve_timezone ──────────────────────────────────────────────────────

    #[test]
    fn test_resolve_timezone_valid() {
        assert_eq!(resolve_timezone("Asia/Kolkata").unwrap(), Tz::Asia__Kolkata);
        assert_eq!(resolve_timezone("UTC").unwrap(), Tz::UTC);
    }

    #[test]
    fn test_resolve_timezone_invalid() {
        let err = resolve_timezone("Not/AZone").unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidTimezone(_)));
    }

    #[test]
    fn test_resolve_timezone_auto_always_resolves() {
        assert!(resolve_timezone("auto").is_ok());
        assert!(resolve_timezone("AUTO").is_ok());
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }

    // ── parse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_z_suffix() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse("2024-01-15T10:30:00Z"), Some(utc(2024, 1, 15, 10, 30)));
    }

    #[test]
    fn test_parse_with_offset_converts_to_utc() {
        let p = PostedDateParser::default();
        assert_eq!(
            p.parse("2024-01-15T10:30:00+05:30"),
            Some(utc(2024, 1, 15, 5, 0))
        );
    }

    #[test]
    fn test_parse_rfc2822() {
        let p = PostedDateParser::default();
        assert_eq!(
            p.parse("Mon, 15 Jan 2024 10:30:00 +0000"),
            Some(utc(2024, 1, 15, 10, 30))
        );
    }

    #[test]
    fn test_parse_naive_uses_reference_timezone() {
        let utc_parser = PostedDateParser::default();
        assert_eq!(
            utc_parser.parse("2024-01-15 10:30:00"),
            Some(utc(2024, 1, 15, 10, 30))
        );

        let ist = PostedDateParser::new(Tz::Asia__Kolkata);
        assert_eq!(ist.parse("2024-01-15 10:30:00"), Some(utc(2024, 1, 15, 5, 0)));
    }

    #[test]
    fn test_parse_date_only_is_local_midnight() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse("2024-01-15"), Some(utc(2024, 1, 15, 0, 0)));
        assert_eq!(p.parse("2024/01/15"), Some(utc(2024, 1, 15, 0, 0)));
    }

    #[test]
    fn test_parse_unix_seconds() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse("1705314600"), Some(utc(2024, 1, 15, 10, 30)));
    }

    #[test]
    fn test_parse_compact_date() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse("20240315"), Some(utc(2024, 3, 15, 0, 0)));

        let ist = PostedDateParser::new(Tz::Asia__Kolkata);
        assert_eq!(ist.parse("20240315"), Some(utc(2024, 3, 14, 18, 30)));
    }

    #[test]
    fn test_parse_short_digit_runs_are_not_timestamps() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse("12345"), None);
        assert_eq!(p.parse("20241345"), None);
        assert_eq!(p.parse("123456789"), None);
    }

    #[test]
    fn test_parse_empty_and_garbage_return_none() {
        let p = PostedDateParser::default();
        assert_eq!(p.parse(""), None);
        assert_eq!(p.parse("   "), None);
        assert_eq!(p.parse("yesterday"), None);
        assert_eq!(p.parse("2024-13-45"), None);
    }

    // ── calendar_date ─────────────────────────────────────────────────────────

    #[test]
    fn test_calendar_date_follows_reference_timezone() {
        let instant = utc(2024, 1, 15, 20, 0);
        assert_eq!(
            PostedDateParser::default().calendar_date(instant),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            PostedDateParser::new(Tz::Asia__Kolkata).calendar_date(instant),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn test_from_setting() {
        let p = PostedDateParser::from_setting("Europe/Berlin").unwrap();
        assert_eq!(p.reference(), Tz::Europe__Berlin);
        assert!(PostedDateParser::from_setting("bogus").is_err());
    }
}
