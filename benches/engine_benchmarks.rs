//! Performance benchmarks for the timesheet engine.
//!
//! This benchmark suite tracks the cost of the computation paths that run
//! on every report request:
//! - wall-clock parsing and duration arithmetic
//! - surcharge classification of a single month
//! - full monthly pay reports for growing timesheet counts
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use timesheet_engine::models::{Role, SurchargeRule, Timesheet, WageProfile, Worker};
use timesheet_engine::payroll::{
    FixedHolidayCalendar, NightWindow, StackingPolicy, compute_month_pay, compute_surcharges,
};
use timesheet_engine::timeclock::shift_duration;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn bench_worker() -> Worker {
    Worker {
        id: "w1".to_string(),
        display_name: "Bench Worker".to_string(),
        role: Role::Employee,
        email: None,
        wage: WageProfile {
            hourly_wage: dec("21.40"),
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
        },
    }
}

/// Builds `count` timesheets across March 2025, cycling through day,
/// evening and overnight spans.
fn build_timesheets(count: usize) -> Vec<Timesheet> {
    let spans = [("08:00", "16:00"), ("14:00", "22:30"), ("22:00", "06:00")];
    (0..count)
        .map(|i| {
            let day = (i % 28) as u32 + 1;
            let (start, end) = spans[i % spans.len()];
            let mut sheet = Timesheet::new(
                "w1",
                "sheet-a",
                NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                Some(start.to_string()),
                Some(end.to_string()),
            );
            sheet.actual_start = sheet.planned_start.clone();
            sheet.actual_end = sheet.planned_end.clone();
            sheet
        })
        .collect()
}

fn bench_shift_duration(c: &mut Criterion) {
    c.bench_function("shift_duration_same_day", |b| {
        b.iter(|| shift_duration(black_box("08:00"), black_box("16:30")))
    });
    c.bench_function("shift_duration_overnight", |b| {
        b.iter(|| shift_duration(black_box("22:00"), black_box("06:00")))
    });
}

fn bench_surcharges(c: &mut Criterion) {
    let worker = bench_worker();
    let timesheets = build_timesheets(28);
    let window = NightWindow::default();
    let calendar = FixedHolidayCalendar::new([NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()]);

    c.bench_function("surcharges_one_month", |b| {
        b.iter(|| {
            compute_surcharges(
                black_box(&worker.wage),
                black_box(&timesheets),
                &window,
                &calendar,
                StackingPolicy::Additive,
            )
        })
    });
}

fn bench_month_pay(c: &mut Criterion) {
    let worker = bench_worker();
    let window = NightWindow::default();
    let calendar = FixedHolidayCalendar::default();

    let mut group = c.benchmark_group("month_pay");
    for count in [1usize, 14, 28, 100] {
        let timesheets = build_timesheets(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &timesheets,
            |b, timesheets| {
                b.iter(|| {
                    compute_month_pay(
                        black_box(&worker),
                        black_box(timesheets),
                        3,
                        2025,
                        &window,
                        &calendar,
                        StackingPolicy::Additive,
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_shift_duration,
    bench_surcharges,
    bench_month_pay
);
criterion_main!(benches);
