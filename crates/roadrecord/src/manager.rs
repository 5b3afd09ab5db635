//! Record manager: the create / update / demerit operations over a store.
//!
//! Every operation reloads the whole store, decodes it into records, works on
//! the matching record in memory, and writes the whole store back. First-time
//! inserts are the only exception; they append a single block.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ValidationConfig;
use crate::demerit::DemeritAssessment;
use crate::error::{Error, Result};
use crate::policy::{self, SkippedChange};
use crate::record::{Record, RecordUpdate};
use crate::storage::{codec, RecordStore};
use crate::validation::Validator;

/// Outcome of [`RecordManager::create_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was validated and appended to the store.
    Inserted,
    /// A record with the same identifier was already stored; nothing was written.
    AlreadyPresent,
}

/// Outcome of [`RecordManager::update_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was found and the store rewritten.
    Updated {
        /// The record as stored after the update.
        record: Record,
        /// Requested changes that were not applied.
        skipped: Vec<SkippedChange>,
    },
    /// No stored record has the identifier; nothing was written.
    NotFound,
}

impl UpdateOutcome {
    /// Check if the identifier was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Outcome of [`RecordManager::add_demerit_points`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemeritOutcome {
    /// The record as stored after the points were added.
    pub record: Record,
    /// The suspension evaluation for this addition.
    pub assessment: DemeritAssessment,
}

/// The two-valued result reported for a demerit point addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The points were recorded.
    Success,
    /// Validation or the store write failed.
    Failed,
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Validates and persists records in a [`RecordStore`].
///
/// "Today" is passed to each operation rather than read from the clock, so
/// age, year bounds, and the suspension window are all deterministic.
#[derive(Debug)]
pub struct RecordManager<S> {
    store: S,
    validation: ValidationConfig,
}

impl<S: RecordStore> RecordManager<S> {
    /// Create a manager with the default validation rules.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_validation(store, ValidationConfig::default())
    }

    /// Create a manager with explicit validation rules.
    #[must_use]
    pub fn with_validation(store: S, validation: ValidationConfig) -> Self {
        Self { store, validation }
    }

    /// Get the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validator in force on `today`.
    #[must_use]
    pub fn validator(&self, today: NaiveDate) -> Validator {
        Validator::from_config(&self.validation, today)
    }

    fn load(&self) -> Result<Vec<Record>> {
        let lines = self.store.read_all()?;
        codec::decode_records(&lines)
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        self.store.write_all(&codec::encode_records(records))
    }

    /// Check if a record with `id` is stored.
    ///
    /// Only the identifier lines are inspected, so a store with damaged
    /// fields elsewhere can still be searched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn contains(&self, id: &str) -> Result<bool> {
        let lines = self.store.read_all()?;
        Ok(lines
            .chunks(codec::LINES_PER_RECORD)
            .any(|block| codec::block_identifier(block) == Some(id)))
    }

    /// Look up a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or decoded.
    pub fn get_record(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.load()?.into_iter().find(|record| record.id == id))
    }

    /// All stored records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or decoded.
    pub fn list_records(&self) -> Result<Vec<Record>> {
        self.load()
    }

    /// Store a new record.
    ///
    /// An identifier that is already stored makes this a no-op that still
    /// succeeds with [`CreateOutcome::AlreadyPresent`]. Otherwise the
    /// identifier, address, and birth date are validated in that order, the
    /// names are checked to fit the name line, and the record is appended.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first invalid field, or a store
    /// error if the store cannot be read or appended to.
    pub fn create_record(&self, record: &Record, today: NaiveDate) -> Result<CreateOutcome> {
        if self.contains(&record.id)? {
            debug!("Record {} already stored", record.id);
            return Ok(CreateOutcome::AlreadyPresent);
        }

        if let Err(err) = record.validate(&self.validator(today)) {
            warn!("Rejected record {}: {}", record.id, err);
            return Err(err.into());
        }

        let text = codec::render(&codec::encode_record(record));
        self.store.append(&text)?;

        info!("Added record {} to {}", record.id, self.store.describe());
        Ok(CreateOutcome::Inserted)
    }

    /// Change fields of a stored record.
    ///
    /// A birth date change must be the only change in the call. Demerit
    /// history and suspension are never affected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BirthDateNotExclusive`] before the store is read when
    /// a birth date change is mixed with other changes,
    /// [`Error::AddressChangeUnderage`] for an address change on someone
    /// under 18, or a store error. Malformed new values are reported in
    /// [`UpdateOutcome::Updated`] as skipped changes.
    pub fn update_record(
        &self,
        id: &str,
        update: &RecordUpdate,
        today: NaiveDate,
    ) -> Result<UpdateOutcome> {
        if update.is_birth_date_conflict() {
            warn!("Rejected update for {}: birth date change is not exclusive", id);
            return Err(Error::BirthDateNotExclusive);
        }

        let mut records = self.load()?;
        let Some(index) = records.iter().position(|record| record.id == id) else {
            warn!("No record {} to update", id);
            return Ok(UpdateOutcome::NotFound);
        };

        let mut record = records[index].clone();
        let skipped = {
            let others = &records;
            policy::apply_update(&mut record, update, &self.validator(today), today, |new_id| {
                others
                    .iter()
                    .enumerate()
                    .any(|(i, other)| i != index && other.id == new_id)
            })?
        };

        records[index] = record.clone();
        self.save(&records)?;

        info!("Updated record {}", record.id);
        Ok(UpdateOutcome::Updated { record, skipped })
    }

    /// Add demerit points for an offense to a stored record.
    ///
    /// The offense date is validated first, then the point value. The new
    /// entry replaces any earlier entry for the same date, suspension is
    /// re-evaluated over the trailing two years, and the record's history is
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad date or point value,
    /// [`Error::NotFound`] if no record has `id`, or a store error.
    pub fn add_demerit_points(
        &self,
        id: &str,
        points: i64,
        offense_date: &str,
        today: NaiveDate,
    ) -> Result<DemeritOutcome> {
        let validator = self.validator(today);

        // Reject bad input before touching the store.
        validator.date(offense_date)?;
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| Error::not_found(id))?;

        let assessment = match record.add_demerit_points(points, offense_date, &validator, today) {
            Ok(assessment) => assessment,
            Err(err) => {
                warn!("Rejected demerit points for {}: {}", id, err);
                return Err(err);
            }
        };
        let record = record.clone();

        self.save(&records)?;

        info!(
            "Recorded {} demerit points on {} for {} ({} in window)",
            points, offense_date, id, assessment.points_in_window
        );
        Ok(DemeritOutcome { record, assessment })
    }
}
