//! Timestamp utilities
//!
//! Instant rendering shared by the window calculator and the snapshot store,
//! plus the [`Clock`] seam used to make expiry testable.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use std::sync::{Mutex, PoisonError};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render an instant as ISO-8601 UTC with millisecond precision (`2025-01-01T00:00:00.000Z`)
pub fn format_utc_millis(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a civil-local instant with explicit UTC offset, truncated to seconds
/// (`2025-03-17T00:00:00+01:00`)
pub fn format_offset_secs(local: DateTime<FixedOffset>) -> String {
    local.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse an RFC 3339 instant into UTC
///
/// Fails with [`Error::InvalidInput`] naming the offending field, so malformed
/// values never reach calendar arithmetic.
pub fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("{field}: cannot parse {value:?} as RFC 3339 instant: {e}")))
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

/// Manually driven clock for tests and replay tooling
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move forward (or backward, for negative durations)
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_utc_millis_keeps_three_digits() {
        let instant = Utc.with_ymd_and_hms(2025, 10, 5, 21, 30, 0).unwrap();
        assert_eq!(format_utc_millis(instant), "2025-10-05T21:30:00.000Z");

        let with_millis = instant + chrono::Duration::milliseconds(42);
        assert_eq!(format_utc_millis(with_millis), "2025-10-05T21:30:00.042Z");
    }

    #[test]
    fn test_format_offset_secs_drops_millis() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2025, 10, 5, 23, 30, 0).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(format_offset_secs(local), "2025-10-05T23:30:00+02:00");
    }

    #[test]
    fn test_parse_instant_normalizes_to_utc() {
        let parsed = parse_instant("now", "2025-03-30T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 30, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        let err = parse_instant("now", "2025-13-45T99:00:00Z").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("now"));

        assert!(parse_instant("now", "").is_err());
        assert!(parse_instant("now", "yesterday").is_err());
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::hours(24));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_system_clock_follows_wall_clock() {
        let clock = SystemClock;
        let before = now();
        let reading = clock.now();
        let after = now();
        assert!(before <= reading && reading <= after);
    }
}
