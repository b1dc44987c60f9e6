//! Civil-time conversion
//!
//! The window calculator never does offset arithmetic itself: it asks a
//! [`CivilTime`] to render absolute instants as local wall-clock time and to
//! map local wall-clock time back to absolute instants. [`TzdbCivilTime`]
//! answers both from the IANA tz database compiled into `chrono-tz`, so
//! government rule changes arrive with a dependency bump rather than a code
//! change.

use crate::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Default civil timezone for the station
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

/// Upper bound when stepping over a skipped wall-clock range (minutes)
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Conversion between absolute instants and a civil timezone's wall clock
pub trait CivilTime: Send + Sync {
    /// IANA name of the zone (e.g. `Europe/Paris`)
    fn name(&self) -> &str;

    /// Render an instant with whichever UTC offset is legally in effect at it
    fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset>;

    /// Map a wall-clock reading to the instant it denotes
    ///
    /// Ambiguous readings (repeated hour on fall-back) resolve to the earliest
    /// instant. Readings inside a spring-forward gap resolve to the first
    /// instant after the gap.
    fn resolve_local(&self, local: NaiveDateTime) -> Result<DateTime<Utc>>;
}

/// [`CivilTime`] backed by the tz database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TzdbCivilTime {
    tz: Tz,
}

impl TzdbCivilTime {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Europe/Paris (UTC+1 standard, UTC+2 daylight)
    pub fn paris() -> Self {
        Self::new(chrono_tz::Europe::Paris)
    }

    /// Look up a zone by IANA name
    ///
    /// An unknown name is an environment configuration error; callers are
    /// expected to abort startup on it.
    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|e| Error::Timezone(format!("unknown timezone {name:?}: {e}")))?;
        Ok(Self::new(tz))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

impl Default for TzdbCivilTime {
    fn default() -> Self {
        Self::paris()
    }
}

impl CivilTime for TzdbCivilTime {
    fn name(&self) -> &str {
        self.tz.name()
    }

    fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.tz).fixed_offset()
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        if let Some(dt) = self.tz.from_local_datetime(&local).earliest() {
            return Ok(dt.with_timezone(&Utc));
        }

        // Wall clock skipped this reading: walk forward to the end of the gap
        let mut probe = local;
        for _ in 0..MAX_GAP_MINUTES {
            probe = probe
                .checked_add_signed(Duration::minutes(1))
                .ok_or_else(|| Error::InvalidInput(format!("local time {local} out of range")))?;
            if let Some(dt) = self.tz.from_local_datetime(&probe).earliest() {
                return Ok(dt.with_timezone(&Utc));
            }
        }

        Err(Error::Timezone(format!(
            "local time {local} does not exist in {} and no valid time follows within a day",
            self.name()
        )))
    }
}
