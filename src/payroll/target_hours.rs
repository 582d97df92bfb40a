//! Prorated monthly target hours.
//!
//! The monthly target prorates the weekly figure by the actual length of the
//! month instead of assuming four weeks: weekly × days-in-month ÷ 7.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Returns the number of days in the given month.
pub fn days_in_month(month: u32, year: i32) -> EngineResult<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(EngineError::InvalidMonth { month })?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(EngineError::InvalidMonth { month })?;
    Ok(next_first.signed_duration_since(first).num_days() as u32)
}

/// Computes the monthly target hours for a weekly figure.
///
/// Rounded to 2 decimals; rounding happens here only, after the division.
///
/// # Examples
///
/// ```
/// use timesheet_engine::payroll::monthly_target_hours;
/// use rust_decimal::Decimal;
///
/// // February 2025 has 28 days: exactly four weeks.
/// let target = monthly_target_hours(Decimal::from(40), 2, 2025).unwrap();
/// assert_eq!(target, Decimal::new(16000, 2));
/// ```
pub fn monthly_target_hours(
    weekly_hours: Decimal,
    month: u32,
    year: i32,
) -> EngineResult<Decimal> {
    let days = days_in_month(month, year)?;
    let target = weekly_hours * Decimal::from(days) / Decimal::from(7);
    Ok(target.round_dp(2))
}
