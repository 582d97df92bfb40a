//! Timesheet engine for personal-assistance care teams.
//!
//! This crate tracks work shifts ("timesheets"), routes each sheet's month
//! through a multi-party signature workflow — employee signatures, then the
//! care recipient's final sign-off — and computes payable hours including
//! night/Sunday/holiday wage surcharges and overtime against a prorated
//! monthly target.

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod timeclock;
pub mod workflow;
