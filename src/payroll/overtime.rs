//! Monthly overtime against the prorated target.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{Timesheet, WageProfile};

use super::target_hours::monthly_target_hours;
use super::worked_hours::collect_worked_hours;

/// One worker's monthly hour balance.
///
/// All figures are rounded to 2 decimals after summation. Overtime may be
/// negative (undertime). Sick and vacation hours are reported separately;
/// they neither count as worked nor as shortfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeReport {
    /// The worker this report covers.
    pub worker_id: String,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Prorated monthly target hours.
    pub target_hours: Decimal,
    /// Hours actually worked.
    pub worked_hours: Decimal,
    /// Hours booked as sick leave.
    pub sick_hours: Decimal,
    /// Hours booked as vacation.
    pub vacation_hours: Decimal,
    /// Worked minus target.
    pub overtime_hours: Decimal,
}

/// Computes a worker's overtime report for one month.
///
/// `timesheets` must be the worker's timesheets of that month.
pub fn compute_overtime(
    worker_id: &str,
    profile: &WageProfile,
    timesheets: &[Timesheet],
    month: u32,
    year: i32,
) -> EngineResult<OvertimeReport> {
    let target = monthly_target_hours(profile.weekly_hours, month, year)?;
    let hours = collect_worked_hours(timesheets)?;

    Ok(OvertimeReport {
        worker_id: worker_id.to_string(),
        month,
        year,
        target_hours: target,
        worked_hours: hours.worked.round_dp(2),
        sick_hours: hours.sick.round_dp(2),
        vacation_hours: hours.vacation.round_dp(2),
        overtime_hours: (hours.worked - target).round_dp(2),
    })
}
