//! Centralized validation and helper functions.
//!
//! Shared by catalog construction and query construction so both boundaries
//! apply the same rules to ranges, TRLs and normalized scores.

use crate::core::interval::Interval;

/// Lowest technology readiness level
pub const MIN_TRL: u8 = 1;

/// Highest technology readiness level
pub const MAX_TRL: u8 = 9;

/// Maximum number of records accepted in one catalog snapshot
pub const MAX_RECORDS: usize = 100_000;

/// Check that a TRL lies in `[MIN_TRL, MAX_TRL]`.
///
/// # Examples
///
/// ```
/// use operando_match::utils::validation::is_valid_trl;
///
/// assert!(is_valid_trl(1));
/// assert!(is_valid_trl(9));
/// assert!(!is_valid_trl(0));
/// assert!(!is_valid_trl(10));
/// ```
#[must_use]
pub fn is_valid_trl(trl: u8) -> bool {
    (MIN_TRL..=MAX_TRL).contains(&trl)
}

/// Check that a normalized score lies in `[0, 1]` (NaN is rejected)
#[must_use]
pub fn is_unit_score(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Describe what is wrong with an interval, or `None` if it is well formed.
///
/// Infinite endpoints are allowed on catalog ranges (half-open operating
/// limits) but rejected on query ranges, see [`describe_requirement_problem`].
#[must_use]
pub fn describe_interval_problem(interval: &Interval) -> Option<String> {
    if interval.min.is_nan() || interval.max.is_nan() {
        return Some("range endpoint is NaN".to_string());
    }
    if interval.min > interval.max {
        return Some(format!(
            "min {} is greater than max {}",
            interval.min, interval.max
        ));
    }
    None
}

/// Like [`describe_interval_problem`] but also requires finite endpoints
#[must_use]
pub fn describe_requirement_problem(interval: &Interval) -> Option<String> {
    if interval.min.is_infinite() || interval.max.is_infinite() {
        return Some("requirement endpoints must be finite".to_string());
    }
    describe_interval_problem(interval)
}

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}
