//! Premium and overtime computation engine.
//!
//! This module computes payable hours from a worker's timesheets: prorated
//! monthly target hours, worked/sick/vacation accumulation, time-of-day and
//! calendar-day wage surcharges (night, Sunday, holiday), and the monthly
//! overtime balance against the target.

mod month_pay;
mod overtime;
mod surcharge;
mod target_hours;
mod worked_hours;

pub use month_pay::{MonthPayReport, compute_month_pay};
pub use overtime::{OvertimeReport, compute_overtime};
pub use surcharge::{
    DaySegment, FixedHolidayCalendar, HolidayCalendar, NightWindow, StackingPolicy,
    SurchargeBreakdown, compute_surcharges, segment_by_day,
};
pub use target_hours::{days_in_month, monthly_target_hours};
pub use worked_hours::{WorkedHours, collect_worked_hours};
