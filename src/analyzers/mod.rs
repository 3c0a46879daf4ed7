//! Aggregation, ranking and bucketing of joined student data.
//!
//! This module turns the joined student table into district metrics,
//! per-school summaries, top/bottom rankings, per-grade score tables and
//! bucketed summaries by spending, size and school type.

pub mod aggregate;
pub mod analyzer;
pub mod bins;
pub mod grade;
pub mod ranking;
pub mod types;
pub mod utility;
