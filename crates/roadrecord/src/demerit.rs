//! Demerit point windowing and suspension rules.
//!
//! Points count toward suspension when their offense date falls within the
//! two years ending at `today`, inclusive of the boundary date. Drivers under
//! 21 are suspended above 6 points; everyone else above 12.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::error::ValidationError;
use crate::record::DemeritHistory;
use crate::validation::parse_date;

/// Length of the suspension window.
pub const WINDOW_MONTHS: u32 = 24;

/// Age from which the higher point limit applies.
pub const FULL_LIMIT_AGE: i32 = 21;

/// Point limit for drivers under [`FULL_LIMIT_AGE`].
pub const YOUNG_DRIVER_LIMIT: u32 = 6;

/// Point limit for drivers aged [`FULL_LIMIT_AGE`] and over.
pub const FULL_LIMIT: u32 = 12;

/// Result of evaluating a history against the suspension rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemeritAssessment {
    /// Age used for the threshold.
    pub age: i32,
    /// Points whose offense dates fall in the window.
    pub points_in_window: u32,
    /// Whether the record is suspended.
    pub suspended: bool,
}

/// Birth year of a stored `DD-MM-YYYY` birth date.
///
/// # Errors
///
/// Returns an error if the date does not have three numeric components.
pub fn birth_year(birth_date: &str) -> Result<i32, ValidationError> {
    parse_date(birth_date, i32::MAX).map(|parts| parts.year)
}

/// Age as the difference between calendar years.
///
/// Birthdays within the year are not taken into account.
///
/// # Errors
///
/// Returns an error if the birth date cannot be parsed.
pub fn age_on(birth_date: &str, today: NaiveDate) -> Result<i32, ValidationError> {
    Ok(today.year() - birth_year(birth_date)?)
}

/// First day of the suspension window ending at `today`.
#[must_use]
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

/// Sum of points for offenses on or after [`window_start`].
#[must_use]
pub fn points_in_window(history: &DemeritHistory, today: NaiveDate) -> u32 {
    history.points_since(window_start(today))
}

/// Point limit for a driver of the given age.
#[must_use]
pub fn suspension_limit(age: i32) -> u32 {
    if age < FULL_LIMIT_AGE {
        YOUNG_DRIVER_LIMIT
    } else {
        FULL_LIMIT
    }
}

/// Check if `points` exceed the limit for `age`.
#[must_use]
pub fn exceeds_limit(age: i32, points: u32) -> bool {
    points > suspension_limit(age)
}

/// Evaluate a history for a driver of the given age.
#[must_use]
pub fn assess(history: &DemeritHistory, age: i32, today: NaiveDate) -> DemeritAssessment {
    let points = points_in_window(history, today);
    DemeritAssessment {
        age,
        points_in_window: points,
        suspended: exceeds_limit(age, points),
    }
}
