//! Core record types for roadrecord.
//!
//! A [`Record`] holds one person's identity, address, birth date, and
//! demerit history. Records are created in memory, validated, and only become
//! durable once the [`RecordManager`](crate::manager::RecordManager) writes
//! them to the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::demerit::{self, DemeritAssessment};
use crate::error::{Result, ValidationError};
use crate::validation::{self, Validator};

/// Smallest point value a single offense can carry.
pub const MIN_POINTS: i64 = 1;

/// Largest point value a single offense can carry.
pub const MAX_POINTS: i64 = 6;

/// Demerit points keyed by offense date, in ascending date order.
///
/// An offense date is unique within a history; recording a second offense on
/// the same date replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemeritHistory(BTreeMap<NaiveDate, u8>);

impl DemeritHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record points for an offense date, returning the points it replaced.
    pub fn record(&mut self, offense_date: NaiveDate, points: u8) -> Option<u8> {
        self.0.insert(offense_date, points)
    }

    /// Points recorded for an offense date.
    #[must_use]
    pub fn get(&self, offense_date: NaiveDate) -> Option<u8> {
        self.0.get(&offense_date).copied()
    }

    /// Iterate entries in ascending offense-date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u8)> + '_ {
        self.0.iter().map(|(date, points)| (*date, *points))
    }

    /// Sum of points for offenses on or after `since`.
    #[must_use]
    pub fn points_since(&self, since: NaiveDate) -> u32 {
        self.0
            .range(since..)
            .map(|(_, points)| u32::from(*points))
            .sum()
    }

    /// Number of recorded offenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no offenses are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, u8)> for DemeritHistory {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One person's registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Ten-character person identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// `number | street | city | state | country`.
    pub address: String,
    /// Birth date as `DD-MM-YYYY`.
    pub birth_date: String,
    /// Demerit points by offense date.
    #[serde(default)]
    pub demerit_history: DemeritHistory,
    /// Whether the licence is suspended. Raised by point accrual, never cleared.
    #[serde(default)]
    pub is_suspended: bool,
}

impl Record {
    /// Create a record with an empty demerit history.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            birth_date: birth_date.into(),
            demerit_history: DemeritHistory::new(),
            is_suspended: false,
        }
    }

    /// Validate identifier, address, and birth date, in that order, then
    /// check that both names can be stored on the name line.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self, validator: &Validator) -> std::result::Result<(), ValidationError> {
        validator.identifier(&self.id)?;
        validator.address(&self.address)?;
        validator.date(&self.birth_date)?;
        validation::check_first_name(&self.first_name)?;
        validation::check_last_name(&self.last_name)?;
        Ok(())
    }

    /// Full name as stored on the name line.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years as of `today`, counted by calendar year only.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored birth date cannot be parsed.
    pub fn age_on(&self, today: NaiveDate) -> Result<i32> {
        Ok(demerit::age_on(&self.birth_date, today)?)
    }

    /// Add demerit points for an offense and re-evaluate suspension.
    ///
    /// `points` must be in 1..=6 and `offense_date` must be a `DD-MM-YYYY`
    /// calendar date accepted by `validator`. On failure the record is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad date, out-of-range points, or an
    /// unparsable stored birth date.
    pub fn add_demerit_points(
        &mut self,
        points: i64,
        offense_date: &str,
        validator: &Validator,
        today: NaiveDate,
    ) -> Result<DemeritAssessment> {
        validator.date(offense_date)?;
        if !(MIN_POINTS..=MAX_POINTS).contains(&points) {
            return Err(ValidationError::PointsOutOfRange(points).into());
        }
        let date = validator.calendar_date(offense_date)?;
        let age = self.age_on(today)?;

        // Range-checked above.
        let points = u8::try_from(points).unwrap_or_default();
        if let Some(previous) = self.demerit_history.record(date, points) {
            warn!(
                "Replaced {} points on {} with {} for {}",
                previous, date, points, self.id
            );
        }

        let assessment = demerit::assess(&self.demerit_history, age, today);
        if assessment.suspended && !self.is_suspended {
            warn!(
                "Suspending {}: {} points within the window at age {}",
                self.id, assessment.points_in_window, age
            );
            self.is_suspended = true;
        }

        Ok(DemeritAssessment {
            suspended: self.is_suspended,
            ..assessment
        })
    }
}

/// Requested field changes for an existing record.
///
/// Every field is optional; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// New identifier.
    pub id: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New birth date. Must not be combined with any other change.
    pub birth_date: Option<String>,
}

impl RecordUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the new given name.
    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set the new family name.
    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the new address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the new birth date.
    #[must_use]
    pub fn birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Check if any field other than the birth date is being changed.
    #[must_use]
    pub fn has_non_birth_date_changes(&self) -> bool {
        self.id.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.address.is_some()
    }

    /// Check if a birth date change is combined with other changes.
    #[must_use]
    pub fn is_birth_date_conflict(&self) -> bool {
        self.birth_date.is_some() && self.has_non_birth_date_changes()
    }

    /// Check if the update requests no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.birth_date.is_none() && !self.has_non_birth_date_changes()
    }
}
