//! Worked, sick and vacation hour accumulation.
//!
//! Only timesheets with a complete effective span contribute. Absence
//! timesheets feed the sick or vacation bucket; they are excluded from
//! worked hours but not penalized as shortfall.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AbsenceKind, Timesheet};
use crate::timeclock::minutes_to_hours;

/// Accumulated hours for one worker's month.
///
/// Values are unrounded; reports round after summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkedHours {
    /// Hours actually worked.
    pub worked: Decimal,
    /// Hours booked as sick leave.
    pub sick: Decimal,
    /// Hours booked as vacation.
    pub vacation: Decimal,
}

/// Accumulates worked/sick/vacation hours from a set of timesheets.
///
/// Timesheets without a complete span are skipped. Malformed time strings
/// fail the whole accumulation; a month with an unparsable entry must not
/// silently produce a short report.
pub fn collect_worked_hours(timesheets: &[Timesheet]) -> EngineResult<WorkedHours> {
    let mut hours = WorkedHours::default();

    for sheet in timesheets {
        let Some(minutes) = sheet.span_minutes()? else {
            continue;
        };
        let span_hours = minutes_to_hours(minutes);
        match sheet.absence {
            AbsenceKind::None => hours.worked += span_hours,
            AbsenceKind::Sick => hours.sick += span_hours,
            AbsenceKind::Vacation => hours.vacation += span_hours,
        }
    }

    Ok(hours)
}
