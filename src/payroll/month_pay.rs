//! Aggregate monthly pay report.
//!
//! Combines the overtime balance with base pay and the surcharge breakdown
//! into the payload backing the overtime/pay reporting operation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{Timesheet, Worker};

use super::overtime::{OvertimeReport, compute_overtime};
use super::surcharge::{HolidayCalendar, NightWindow, StackingPolicy, SurchargeBreakdown, compute_surcharges};
use super::worked_hours::collect_worked_hours;

/// Base pay, surcharges and hour balance for one worker's month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPayReport {
    /// The hour balance.
    pub overtime: OvertimeReport,
    /// Surcharge hours and amounts.
    pub surcharges: SurchargeBreakdown,
    /// Worked hours times the base wage.
    pub base_pay: Decimal,
    /// Base pay plus all surcharges.
    pub total_pay: Decimal,
}

/// Computes the full pay report for one worker's month.
///
/// `timesheets` must be the worker's timesheets of that month. Base pay is
/// computed from unrounded worked hours and rounded once at the end.
pub fn compute_month_pay(
    worker: &Worker,
    timesheets: &[Timesheet],
    month: u32,
    year: i32,
    window: &NightWindow,
    calendar: &dyn HolidayCalendar,
    policy: StackingPolicy,
) -> EngineResult<MonthPayReport> {
    let overtime = compute_overtime(&worker.id, &worker.wage, timesheets, month, year)?;
    let surcharges = compute_surcharges(&worker.wage, timesheets, window, calendar, policy)?;

    let hours = collect_worked_hours(timesheets)?;
    let base_pay = (hours.worked * worker.wage.hourly_wage).round_dp(2);
    let total_pay = (base_pay + surcharges.total_amount).round_dp(2);

    Ok(MonthPayReport {
        overtime,
        surcharges,
        base_pay,
        total_pay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SurchargeRule, WageProfile};
    use crate::payroll::FixedHolidayCalendar;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn worker() -> Worker {
        Worker {
            id: "w1".to_string(),
            display_name: "Ada".to_string(),
            role: Role::Employee,
            email: None,
            wage: WageProfile {
                hourly_wage: dec("20"),
                weekly_hours: dec("40"),
                night: SurchargeRule {
                    enabled: true,
                    percent: dec("25"),
                },
                sunday: SurchargeRule {
                    enabled: true,
                    percent: dec("50"),
                },
                holiday: SurchargeRule::off(),
            },
        }
    }

    fn sheet(day: &str, start: &str, end: &str) -> Timesheet {
        Timesheet::new(
            "w1",
            "sheet-a",
            NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            Some(start.to_string()),
            Some(end.to_string()),
        )
    }

    #[test]
    fn test_total_is_base_plus_surcharges() {
        // Sunday 2025-03-09, 8h: base 160, sunday surcharge 80
        let sheets = vec![sheet("2025-03-09", "08:00", "16:00")];
        let report = compute_month_pay(
            &worker(),
            &sheets,
            3,
            2025,
            &NightWindow::default(),
            &FixedHolidayCalendar::default(),
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(report.base_pay, dec("160.00"));
        assert_eq!(report.surcharges.sunday_amount, dec("80.00"));
        assert_eq!(report.total_pay, dec("240.00"));
        assert_eq!(report.overtime.worked_hours, dec("8.00"));
    }

    #[test]
    fn test_empty_month_reports_zero_pay() {
        let report = compute_month_pay(
            &worker(),
            &[],
            3,
            2025,
            &NightWindow::default(),
            &FixedHolidayCalendar::default(),
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(report.base_pay, dec("0.00"));
        assert_eq!(report.total_pay, dec("0.00"));
        // 40 * 31 / 7
        assert_eq!(report.overtime.target_hours, dec("177.14"));
    }
}
