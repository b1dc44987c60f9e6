//! Sync window calculation
//!
//! The reconciliation pass compares local episodes against remote playouts over
//! a three-week span: the previous, current and next civil week, Monday 00:00
//! through Sunday 23:59:59 local time. Week boundaries are found on the civil
//! calendar and only then converted to UTC, so a window crossing a DST change
//! is 23 or 25 hours shorter or longer than 21 days rather than misaligned.
//!
//! A show that is on air when the window is computed may have started before
//! the previous-week Monday; in that case the window start is pulled back to
//! the show start so the airing show is part of the comparison.

use crate::civil_time::{CivilTime, TzdbCivilTime};
use crate::time::{format_offset_secs, format_utc_millis, parse_instant};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Civil weeks before the current one covered by the window
const WEEKS_BEFORE: u64 = 1;
/// Civil weeks after the current one covered by the window
const WEEKS_AFTER: u64 = 1;
/// Days around every input instant that must stay on the representable
/// calendar: the whole window plus a day of civil offset on either side
const CALENDAR_MARGIN_DAYS: i64 = 7 * (WEEKS_BEFORE + WEEKS_AFTER + 1) as i64 + 2;

/// Inputs to [`compute_sync_window`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindowInput {
    /// Reference instant (current time in production)
    pub now: DateTime<Utc>,
    /// Start of the show currently on air, if known
    pub current_show_start_utc: Option<DateTime<Utc>>,
}

impl SyncWindowInput {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            current_show_start_utc: None,
        }
    }

    pub fn with_current_show_start(mut self, start: DateTime<Utc>) -> Self {
        self.current_show_start_utc = Some(start);
        self
    }

    /// Build input from RFC 3339 strings, failing on anything unparsable
    pub fn parse(now: &str, current_show_start_utc: Option<&str>) -> Result<Self> {
        let now = parse_instant("now", now)?;
        let current_show_start_utc = current_show_start_utc
            .map(|s| parse_instant("currentShowStartUtc", s))
            .transpose()?;
        Ok(Self {
            now,
            current_show_start_utc,
        })
    }
}

/// Computed sync window
///
/// Rendered fields are stored in their wire form; two computations from the
/// same input compare equal field by field and serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWindow {
    /// Window start, ISO-8601 UTC with milliseconds
    pub utc_start: String,
    /// Window end, ISO-8601 UTC with milliseconds
    pub utc_end: String,
    /// `utc_start` in civil-local time with offset, seconds precision
    pub paris_start: String,
    /// `utc_end` in civil-local time with offset, seconds precision
    pub paris_end: String,
    /// ISO weeks of the civil start and end dates, `YYYY-Www..YYYY-Www`
    pub weeks_label: String,
    /// Reference instant, ISO-8601 UTC with milliseconds
    pub now_utc: String,
    /// Reference instant in civil-local time with offset
    pub now_paris: String,
    /// `utc_end - utc_start` in milliseconds
    pub window_duration_ms: i64,
}

impl SyncWindow {
    /// Whether `instant` lies within `[utc_start, utc_end]`
    pub fn contains(&self, instant: DateTime<Utc>) -> Result<bool> {
        let start = parse_instant("utcStart", &self.utc_start)?;
        let end = parse_instant("utcEnd", &self.utc_end)?;
        Ok(start <= instant && instant <= end)
    }
}

/// Compute the sync window in the station's default civil timezone (Europe/Paris)
pub fn compute_sync_window(input: &SyncWindowInput) -> Result<SyncWindow> {
    compute_sync_window_in(input, &TzdbCivilTime::paris())
}

/// Compute the sync window against an explicit civil timezone
pub fn compute_sync_window_in(input: &SyncWindowInput, civil: &dyn CivilTime) -> Result<SyncWindow> {
    ensure_representable("now", input.now)?;
    if let Some(show_start) = input.current_show_start_utc {
        ensure_representable("currentShowStartUtc", show_start)?;
    }

    let now_local = civil.to_local(input.now);
    let current_week_start = monday_of(now_local.date_naive()).ok_or_else(|| out_of_range("now", input.now))?;

    let first_day = current_week_start
        .checked_sub_days(Days::new(7 * WEEKS_BEFORE))
        .ok_or_else(|| out_of_range("now", input.now))?;
    let last_day = current_week_start
        .checked_add_days(Days::new(7 * (WEEKS_AFTER + 1) - 1))
        .ok_or_else(|| out_of_range("now", input.now))?;
    let end_of_last_day = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| Error::Internal("23:59:59 is not a valid time".to_string()))?;

    let default_start = civil.resolve_local(first_day.and_time(NaiveTime::MIN))?;
    let utc_end = civil.resolve_local(last_day.and_time(end_of_last_day))?;

    let utc_start = match input.current_show_start_utc {
        Some(show_start) if show_start < default_start => {
            debug!(
                "Widening sync window start from {} to current show start {}",
                format_utc_millis(default_start),
                format_utc_millis(show_start)
            );
            show_start
        }
        _ => default_start,
    };

    let local_start = civil.to_local(utc_start);
    let local_end = civil.to_local(utc_end);

    let window = SyncWindow {
        utc_start: format_utc_millis(utc_start),
        utc_end: format_utc_millis(utc_end),
        paris_start: format_offset_secs(local_start),
        paris_end: format_offset_secs(local_end),
        weeks_label: format!("{}..{}", iso_week_label(local_start), iso_week_label(local_end)),
        now_utc: format_utc_millis(input.now),
        now_paris: format_offset_secs(now_local),
        window_duration_ms: (utc_end - utc_start).num_milliseconds(),
    };

    debug!(
        "Computed sync window {} ({} .. {}) in {}",
        window.weeks_label,
        window.utc_start,
        window.utc_end,
        civil.name()
    );

    Ok(window)
}

/// Monday of the ISO week containing `date`
fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

/// Reject instants too close to the ends of the calendar for civil-local
/// rendering and week arithmetic
fn ensure_representable(field: &str, instant: DateTime<Utc>) -> Result<()> {
    let margin = Duration::days(CALENDAR_MARGIN_DAYS);
    let naive = instant.naive_utc();
    if naive.checked_sub_signed(margin).is_none() || naive.checked_add_signed(margin).is_none() {
        return Err(out_of_range(field, instant));
    }
    Ok(())
}

/// `YYYY-Www` using the ISO week-year
fn iso_week_label(local: DateTime<FixedOffset>) -> String {
    let week = local.date_naive().iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

fn out_of_range(field: &str, instant: DateTime<Utc>) -> Error {
    Error::InvalidInput(format!(
        "{field}: sync window around {} UTC falls outside the representable calendar",
        instant.naive_utc()
    ))
}
