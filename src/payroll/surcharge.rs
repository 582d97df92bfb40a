//! Night, Sunday and holiday surcharge computation.
//!
//! Each worked span is split at midnight into day segments, and each day
//! segment into a night zone and a non-night zone. Within a zone every
//! minute shares the same bucket membership (night / Sunday / holiday), so
//! surcharge amounts follow directly from zone length, the worker's wage
//! and the enabled rule percentages. Buckets may overlap in time; whether
//! overlapping surcharges stack uncapped or against a ceiling is an explicit
//! [`StackingPolicy`], never an implicit behavior.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{Timesheet, WageProfile};
use crate::timeclock::{self, MINUTES_PER_DAY, minutes_to_hours};

/// Supplies the public-holiday calendar; provided by the caller.
pub trait HolidayCalendar {
    /// Returns true if the given date is a public holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// A holiday calendar backed by an explicit set of dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl FixedHolidayCalendar {
    /// Creates a calendar from the given holiday dates.
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// The nightly surcharge window, as minute offsets within a day.
///
/// A window whose start is later than its end crosses midnight
/// (the default, 22:00-06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    start: u32,
    end: u32,
}

impl NightWindow {
    /// Builds a window from "HH:MM" boundaries.
    pub fn new(start: &str, end: &str) -> EngineResult<Self> {
        Ok(Self {
            start: timeclock::parse_clock_time(start)?,
            end: timeclock::parse_clock_time(end)?,
        })
    }

    /// Returns the night minutes within `[from, to)` of a single day.
    fn overlap_minutes(&self, from: u32, to: u32) -> u32 {
        let ranges: [(u32, u32); 2] = if self.start < self.end {
            [(self.start, self.end), (0, 0)]
        } else {
            // crosses midnight: late evening plus early morning
            [(self.start, MINUTES_PER_DAY), (0, self.end)]
        };
        ranges
            .iter()
            .map(|&(a, b)| to.min(b).saturating_sub(from.max(a)))
            .sum()
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start: 22 * 60,
            end: 6 * 60,
        }
    }
}

/// How overlapping surcharges combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingPolicy {
    /// Each bucket contributes its full percentage; a Sunday-night hour
    /// earns both surcharges.
    Additive,
    /// The combined percentage on any minute is capped; contributing
    /// buckets are scaled down proportionally.
    CappedPercent(Decimal),
}

/// A portion of a shift lying within one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    /// The calendar day of this segment.
    pub date: NaiveDate,
    /// Start minute within the day (inclusive).
    pub start_minute: u32,
    /// End minute within the day (exclusive, at most 1440).
    pub end_minute: u32,
}

/// Splits a shift at midnight.
///
/// `date` is the day the shift starts on; a span whose end precedes its
/// start wraps into the following day, producing a second segment.
pub fn segment_by_day(date: NaiveDate, start: &str, end: &str) -> EngineResult<Vec<DaySegment>> {
    let duration = timeclock::shift_duration(start, end)?;
    if duration == 0 {
        return Ok(Vec::new());
    }

    let mut start_minute = timeclock::parse_clock_time(start)?;
    let mut date = date;
    if start_minute == MINUTES_PER_DAY {
        // "24:00" start is midnight of the following day
        start_minute = 0;
        date += Duration::days(1);
    }

    let end_absolute = start_minute + duration;
    let mut segments = vec![DaySegment {
        date,
        start_minute,
        end_minute: end_absolute.min(MINUTES_PER_DAY),
    }];
    if end_absolute > MINUTES_PER_DAY {
        segments.push(DaySegment {
            date: date + Duration::days(1),
            start_minute: 0,
            end_minute: end_absolute - MINUTES_PER_DAY,
        });
    }
    Ok(segments)
}

/// Surcharge hours and amounts for one worker's timesheets.
///
/// Hours and amounts are rounded to 2 decimals after summation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurchargeBreakdown {
    /// Hours classified into the night bucket.
    pub night_hours: Decimal,
    /// Hours classified into the Sunday bucket.
    pub sunday_hours: Decimal,
    /// Hours classified into the holiday bucket.
    pub holiday_hours: Decimal,
    /// Surcharge amount for night hours.
    pub night_amount: Decimal,
    /// Surcharge amount for Sunday hours.
    pub sunday_amount: Decimal,
    /// Surcharge amount for holiday hours.
    pub holiday_amount: Decimal,
    /// Total surcharge amount on top of base pay.
    pub total_amount: Decimal,
}

// A run of minutes with uniform bucket membership.
struct Zone {
    minutes: u32,
    night: bool,
    sunday: bool,
    holiday: bool,
}

/// Computes the surcharge breakdown for a worker's timesheets.
///
/// Absence timesheets and timesheets without a complete span are skipped.
/// Break minutes carry no position in time and are not excluded from
/// classification. Buckets only accumulate for rules enabled in the
/// worker's [`WageProfile`].
pub fn compute_surcharges(
    profile: &WageProfile,
    timesheets: &[Timesheet],
    window: &NightWindow,
    calendar: &dyn HolidayCalendar,
    policy: StackingPolicy,
) -> EngineResult<SurchargeBreakdown> {
    let mut night_minutes: u32 = 0;
    let mut sunday_minutes: u32 = 0;
    let mut holiday_minutes: u32 = 0;
    let mut night_amount = Decimal::ZERO;
    let mut sunday_amount = Decimal::ZERO;
    let mut holiday_amount = Decimal::ZERO;

    for sheet in timesheets {
        if sheet.is_absence() {
            continue;
        }
        let Some((start, end)) = sheet.effective_span() else {
            continue;
        };

        for segment in segment_by_day(sheet.date, start, end)? {
            let length = segment.end_minute - segment.start_minute;
            let in_night = window.overlap_minutes(segment.start_minute, segment.end_minute);
            let sunday = segment.date.weekday() == Weekday::Sun;
            let holiday = calendar.is_holiday(segment.date);

            let zones = [
                Zone {
                    minutes: in_night,
                    night: true,
                    sunday,
                    holiday,
                },
                Zone {
                    minutes: length - in_night,
                    night: false,
                    sunday,
                    holiday,
                },
            ];

            for zone in zones {
                if zone.minutes == 0 {
                    continue;
                }

                let night_pct = (zone.night && profile.night.enabled)
                    .then_some(profile.night.percent)
                    .unwrap_or(Decimal::ZERO);
                let sunday_pct = (zone.sunday && profile.sunday.enabled)
                    .then_some(profile.sunday.percent)
                    .unwrap_or(Decimal::ZERO);
                let holiday_pct = (zone.holiday && profile.holiday.enabled)
                    .then_some(profile.holiday.percent)
                    .unwrap_or(Decimal::ZERO);

                let combined = night_pct + sunday_pct + holiday_pct;
                if combined.is_zero() {
                    continue;
                }
                let scale = match policy {
                    StackingPolicy::Additive => Decimal::ONE,
                    StackingPolicy::CappedPercent(cap) => {
                        if combined > cap {
                            cap / combined
                        } else {
                            Decimal::ONE
                        }
                    }
                };

                let hours = minutes_to_hours(zone.minutes);
                let base = hours * profile.hourly_wage / Decimal::from(100) * scale;

                if !night_pct.is_zero() {
                    night_minutes += zone.minutes;
                    night_amount += base * night_pct;
                }
                if !sunday_pct.is_zero() {
                    sunday_minutes += zone.minutes;
                    sunday_amount += base * sunday_pct;
                }
                if !holiday_pct.is_zero() {
                    holiday_minutes += zone.minutes;
                    holiday_amount += base * holiday_pct;
                }
            }
        }
    }

    let total = night_amount + sunday_amount + holiday_amount;
    Ok(SurchargeBreakdown {
        night_hours: minutes_to_hours(night_minutes).round_dp(2),
        sunday_hours: minutes_to_hours(sunday_minutes).round_dp(2),
        holiday_hours: minutes_to_hours(holiday_minutes).round_dp(2),
        night_amount: night_amount.round_dp(2),
        sunday_amount: sunday_amount.round_dp(2),
        holiday_amount: holiday_amount.round_dp(2),
        total_amount: total.round_dp(2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SurchargeRule;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn profile() -> WageProfile {
        WageProfile {
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
            holiday: SurchargeRule {
                enabled: true,
                percent: dec("100"),
            },
        }
    }

    fn sheet(day: &str, start: &str, end: &str) -> Timesheet {
        Timesheet::new(
            "w1",
            "sheet-a",
            date(day),
            Some(start.to_string()),
            Some(end.to_string()),
        )
    }

    fn no_holidays() -> FixedHolidayCalendar {
        FixedHolidayCalendar::default()
    }

    #[test]
    fn test_night_window_overlap_crossing_midnight() {
        let window = NightWindow::default(); // 22:00-06:00
        assert_eq!(window.overlap_minutes(0, 1440), 480);
        assert_eq!(window.overlap_minutes(8 * 60, 16 * 60), 0);
        assert_eq!(window.overlap_minutes(21 * 60, 23 * 60), 60);
        assert_eq!(window.overlap_minutes(0, 6 * 60), 360);
    }

    #[test]
    fn test_night_window_overlap_same_day() {
        let window = NightWindow::new("20:00", "23:00").unwrap();
        assert_eq!(window.overlap_minutes(19 * 60, 21 * 60), 60);
        assert_eq!(window.overlap_minutes(0, 1440), 180);
    }

    #[test]
    fn test_segment_by_day_single_day() {
        let segments = segment_by_day(date("2025-03-10"), "08:00", "16:00").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].date, date("2025-03-10"));
        assert_eq!(segments[0].start_minute, 480);
        assert_eq!(segments[0].end_minute, 960);
    }

    #[test]
    fn test_segment_by_day_overnight() {
        let segments = segment_by_day(date("2025-03-08"), "22:00", "06:00").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].date, date("2025-03-08"));
        assert_eq!(segments[0].start_minute, 1320);
        assert_eq!(segments[0].end_minute, 1440);
        assert_eq!(segments[1].date, date("2025-03-09"));
        assert_eq!(segments[1].start_minute, 0);
        assert_eq!(segments[1].end_minute, 360);
    }

    #[test]
    fn test_segment_by_day_full_day_special_case() {
        let segments = segment_by_day(date("2025-03-10"), "00:00", "00:00").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_minute, 0);
        assert_eq!(segments[0].end_minute, 1440);
    }

    #[test]
    fn test_sunday_shift_earns_sunday_surcharge() {
        // 2025-03-09 is a Sunday
        let sheets = vec![sheet("2025-03-09", "08:00", "16:00")];
        let result = compute_surcharges(
            &profile(),
            &sheets,
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(result.sunday_hours, dec("8.00"));
        // 8h * 20 * 50% = 80
        assert_eq!(result.sunday_amount, dec("80.00"));
        assert_eq!(result.night_amount, dec("0.00"));
        assert_eq!(result.total_amount, dec("80.00"));
    }

    #[test]
    fn test_overnight_shift_collects_night_hours_on_both_days() {
        // Monday 22:00 to Tuesday 06:00, all inside the night window
        let sheets = vec![sheet("2025-03-10", "22:00", "06:00")];
        let result = compute_surcharges(
            &profile(),
            &sheets,
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(result.night_hours, dec("8.00"));
        // 8h * 20 * 25% = 40
        assert_eq!(result.night_amount, dec("40.00"));
        assert_eq!(result.total_amount, dec("40.00"));
    }

    #[test]
    fn test_saturday_into_sunday_stacks_night_and_sunday() {
        // Saturday 2025-03-08 22:00 -> Sunday 06:00
        let sheets = vec![sheet("2025-03-08", "22:00", "06:00")];
        let result = compute_surcharges(
            &profile(),
            &sheets,
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::Additive,
        )
        .unwrap();

        // all 8 night hours, 6 of them also on the Sunday
        assert_eq!(result.night_hours, dec("8.00"));
        assert_eq!(result.sunday_hours, dec("6.00"));
        assert_eq!(result.night_amount, dec("40.00"));
        // 6h * 20 * 50% = 60
        assert_eq!(result.sunday_amount, dec("60.00"));
        assert_eq!(result.total_amount, dec("100.00"));
    }

    #[test]
    fn test_capped_policy_scales_contributions_proportionally() {
        let sheets = vec![sheet("2025-03-08", "22:00", "06:00")];
        let result = compute_surcharges(
            &profile(),
            &sheets,
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::CappedPercent(dec("60")),
        )
        .unwrap();

        // Saturday night zone: 25% <= cap, unscaled: 2h * 20 * 25% = 10
        // Sunday night zone: 25+50=75% -> scaled by 60/75:
        //   night 6h * 20 * 25% * 0.8 = 24, sunday 6h * 20 * 50% * 0.8 = 48
        assert_eq!(result.night_amount, dec("34.00"));
        assert_eq!(result.sunday_amount, dec("48.00"));
        assert_eq!(result.total_amount, dec("82.00"));
    }

    #[test]
    fn test_holiday_surcharge_uses_calendar() {
        let calendar = FixedHolidayCalendar::new([date("2025-03-10")]);
        let sheets = vec![sheet("2025-03-10", "08:00", "16:00")];
        let result = compute_surcharges(
            &profile(),
            &sheets,
            &NightWindow::default(),
            &calendar,
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(result.holiday_hours, dec("8.00"));
        // 8h * 20 * 100% = 160
        assert_eq!(result.holiday_amount, dec("160.00"));
    }

    #[test]
    fn test_disabled_rules_contribute_nothing() {
        let mut p = profile();
        p.sunday = SurchargeRule::off();
        let sheets = vec![sheet("2025-03-09", "08:00", "16:00")];
        let result = compute_surcharges(
            &p,
            &sheets,
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::Additive,
        )
        .unwrap();

        assert_eq!(result.sunday_hours, dec("0.00"));
        assert_eq!(result.total_amount, dec("0.00"));
    }

    #[test]
    fn test_absence_sheets_are_skipped() {
        let mut ts = sheet("2025-03-09", "08:00", "16:00");
        ts.absence = crate::models::AbsenceKind::Sick;
        let result = compute_surcharges(
            &profile(),
            &[ts],
            &NightWindow::default(),
            &no_holidays(),
            StackingPolicy::Additive,
        )
        .unwrap();
        assert_eq!(result.total_amount, dec("0.00"));
    }
}
