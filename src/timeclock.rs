//! Wall-clock time arithmetic.
//!
//! Timesheets carry start and end times as "HH:MM" strings. This module
//! parses them into minute offsets, computes durations across midnight and
//! formats ranges and durations for display.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Number of minutes in a full day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Parses a wall-clock string into minutes since midnight.
///
/// Accepts "H:MM" and "HH:MM" with hours 0-23 and minutes 0-59, plus the
/// special value "24:00" (→ 1440) marking end-of-day. Anything else is
/// rejected as [`EngineError::InvalidClockTime`].
///
/// # Examples
///
/// ```
/// use timesheet_engine::timeclock::parse_clock_time;
///
/// assert_eq!(parse_clock_time("08:30").unwrap(), 510);
/// assert_eq!(parse_clock_time("8:30").unwrap(), 510);
/// assert_eq!(parse_clock_time("24:00").unwrap(), 1440);
/// assert!(parse_clock_time("24:01").is_err());
/// assert!(parse_clock_time("7:5").is_err());
/// ```
pub fn parse_clock_time(s: &str) -> EngineResult<u32> {
    let invalid = || EngineError::InvalidClockTime {
        value: s.to_string(),
    };

    let (hours_part, minutes_part) = s.split_once(':').ok_or_else(invalid)?;
    if hours_part.is_empty() || hours_part.len() > 2 || minutes_part.len() != 2 {
        return Err(invalid());
    }
    if !hours_part.bytes().all(|b| b.is_ascii_digit())
        || !minutes_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: u32 = hours_part.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes_part.parse().map_err(|_| invalid())?;

    if hours == 24 && minutes == 0 {
        return Ok(MINUTES_PER_DAY);
    }
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Computes the duration of a shift in minutes.
///
/// When `end` is earlier than `start` the shift is treated as crossing
/// midnight and a full day is added. The pair 00:00/00:00 means a full
/// 24-hour span, not an empty one; any other identical pair is zero minutes.
///
/// # Examples
///
/// ```
/// use timesheet_engine::timeclock::shift_duration;
///
/// assert_eq!(shift_duration("08:00", "16:00").unwrap(), 480);
/// assert_eq!(shift_duration("23:00", "06:00").unwrap(), 420);
/// assert_eq!(shift_duration("00:00", "00:00").unwrap(), 1440);
/// ```
pub fn shift_duration(start: &str, end: &str) -> EngineResult<u32> {
    let start_minutes = parse_clock_time(start)?;
    let end_minutes = parse_clock_time(end)?;

    if start_minutes == 0 && end_minutes == 0 {
        return Ok(MINUTES_PER_DAY);
    }
    if end_minutes < start_minutes {
        return Ok(end_minutes + MINUTES_PER_DAY - start_minutes);
    }
    Ok(end_minutes - start_minutes)
}

/// Formats a start/end pair for display.
///
/// An end of "00:00" is rendered as "24:00" so a shift that ran to the end
/// of the day is not mistaken for one that just started.
///
/// # Examples
///
/// ```
/// use timesheet_engine::timeclock::format_range;
///
/// assert_eq!(format_range("08:00", "16:00"), "08:00-16:00");
/// assert_eq!(format_range("16:00", "00:00"), "16:00-24:00");
/// ```
pub fn format_range(start: &str, end: &str) -> String {
    let end = if end == "00:00" { "24:00" } else { end };
    format!("{}-{}", start, end)
}

/// Formats a minute count as "H:MM".
pub fn format_minutes(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Converts a minute count to decimal hours.
///
/// Used by the premium engine; rounding to 2 decimals happens only after
/// summation, never here.
pub fn minutes_to_hours(minutes: u32) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}
