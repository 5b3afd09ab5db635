//! Field mutation rules for record updates.
//!
//! A birth date change is exclusive of every other change. An identifier may
//! only change while the current one starts with an odd digit. An address may
//! only change for a person aged 18 or over; for anyone younger the whole
//! update is refused. Names change when supplied, as long as they fit the
//! name line. Malformed values are skipped and reported rather than failing
//! the update. Demerit history and suspension are never touched here.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result, ValidationError};
use crate::record::{Record, RecordUpdate};
use crate::validation::{self, Validator};

/// Minimum age for an address change.
pub const MIN_ADDRESS_CHANGE_AGE: i32 = 18;

/// A requested change that was left unapplied without failing the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedChange {
    /// The current identifier starts with an even digit.
    IdentifierLocked {
        /// The identifier that stays in place.
        current: String,
    },
    /// The new identifier is not well formed.
    InvalidIdentifier(ValidationError),
    /// Another record already uses the new identifier.
    IdentifierTaken(String),
    /// The new address is not well formed.
    InvalidAddress(ValidationError),
    /// The new birth date is not well formed.
    InvalidBirthDate(ValidationError),
    /// A new name cannot be stored on the name line.
    InvalidName(ValidationError),
}

impl fmt::Display for SkippedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentifierLocked { current } => {
                write!(f, "identifier {current} starts with an even digit and cannot change")
            }
            Self::InvalidIdentifier(err) => write!(f, "new identifier rejected: {err}"),
            Self::IdentifierTaken(id) => write!(f, "identifier {id} is already in use"),
            Self::InvalidAddress(err) => write!(f, "new address rejected: {err}"),
            Self::InvalidBirthDate(err) => write!(f, "new birth date rejected: {err}"),
            Self::InvalidName(err) => write!(f, "new name rejected: {err}"),
        }
    }
}

/// Check if an identifier's first character is odd, which unlocks changing it.
#[must_use]
pub fn identifier_is_mutable(id: &str) -> bool {
    id.chars().next().is_some_and(|c| u32::from(c) % 2 == 1)
}

/// Apply `update` to `record` in memory.
///
/// `is_taken` reports whether another stored record already uses an
/// identifier. On error `record` is unchanged.
///
/// # Errors
///
/// Returns [`Error::BirthDateNotExclusive`] when a birth date change is mixed
/// with other changes, and [`Error::AddressChangeUnderage`] when an address
/// change is requested for someone under 18. Malformed new values are
/// skipped, not errors.
pub fn apply_update(
    record: &mut Record,
    update: &RecordUpdate,
    validator: &Validator,
    today: NaiveDate,
    is_taken: impl Fn(&str) -> bool,
) -> Result<Vec<SkippedChange>> {
    if update.is_birth_date_conflict() {
        return Err(Error::BirthDateNotExclusive);
    }

    if let Some(birth_date) = &update.birth_date {
        if let Err(err) = validator.date(birth_date) {
            let change = SkippedChange::InvalidBirthDate(err);
            warn!("Skipped change for {}: {}", record.id, change);
            return Ok(vec![change]);
        }
        debug!("Changing birth date of {} to {}", record.id, birth_date);
        record.birth_date.clone_from(birth_date);
        return Ok(Vec::new());
    }

    // Checked before anything is mutated so a refusal leaves the record intact.
    if update.address.is_some() {
        let age = record.age_on(today)?;
        if age < MIN_ADDRESS_CHANGE_AGE {
            warn!("Refusing address change for {} aged {}", record.id, age);
            return Err(Error::AddressChangeUnderage { age });
        }
    }

    let mut skipped = Vec::new();

    if let Some(new_id) = &update.id {
        if !identifier_is_mutable(&record.id) {
            skipped.push(SkippedChange::IdentifierLocked {
                current: record.id.clone(),
            });
        } else if let Err(err) = validator.identifier(new_id) {
            skipped.push(SkippedChange::InvalidIdentifier(err));
        } else if *new_id != record.id && is_taken(new_id) {
            skipped.push(SkippedChange::IdentifierTaken(new_id.clone()));
        } else {
            debug!("Changing identifier {} to {}", record.id, new_id);
            record.id.clone_from(new_id);
        }
    }

    if let Some(address) = &update.address {
        match validator.address(address) {
            Ok(()) => record.address.clone_from(address),
            Err(err) => skipped.push(SkippedChange::InvalidAddress(err)),
        }
    }

    if let Some(first_name) = &update.first_name {
        match validation::check_first_name(first_name) {
            Ok(()) => record.first_name.clone_from(first_name),
            Err(err) => skipped.push(SkippedChange::InvalidName(err)),
        }
    }
    if let Some(last_name) = &update.last_name {
        match validation::check_last_name(last_name) {
            Ok(()) => record.last_name.clone_from(last_name),
            Err(err) => skipped.push(SkippedChange::InvalidName(err)),
        }
    }

    for change in &skipped {
        warn!("Skipped change for {}: {}", record.id, change);
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "32 | Highland Street | Melbourne | Victoria | Australia";
    const NEW_ADDRESS: &str = "33 | Highland Street | Melbourne | Victoria | Australia";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn validator() -> Validator {
        Validator::new("Victoria", 2026)
    }

    fn create_test_record(id: &str, birth_date: &str) -> Record {
        Record::new(id, "John", "Doe", ADDRESS, birth_date)
    }

    fn apply(record: &mut Record, update: &RecordUpdate) -> Result<Vec<SkippedChange>> {
        apply_update(record, update, &validator(), today(), |_| false)
    }

    #[test]
    fn test_identifier_is_mutable() {
        assert!(identifier_is_mutable("56@#df&*AB"));
        assert!(identifier_is_mutable("36@#df&*AB"));
        assert!(!identifier_is_mutable("26@#df&*AB"));
        assert!(!identifier_is_mutable("86@#df&*AB"));
        assert!(!identifier_is_mutable(""));
    }

    #[test]
    fn test_name_change() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().first_name("Jake")).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(record.full_name(), "Jake Doe");
    }

    #[test]
    fn test_birth_date_with_other_field_rejected() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let original = record.clone();
        let update = RecordUpdate::new().first_name("Jake").birth_date("15-11-2001");

        assert!(matches!(
            apply(&mut record, &update),
            Err(Error::BirthDateNotExclusive)
        ));
        assert_eq!(record, original);
    }

    #[test]
    fn test_birth_date_only() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().birth_date("15-11-2001")).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(record.birth_date, "15-11-2001");
    }

    #[test]
    fn test_birth_date_invalid_is_skipped() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().birth_date("15/11/2001")).unwrap();

        assert_eq!(record.birth_date, "15-11-2000");
        assert_eq!(
            skipped,
            vec![SkippedChange::InvalidBirthDate(ValidationError::DateFormat(
                "15/11/2001".to_string()
            ))]
        );
    }

    #[test]
    fn test_unstorable_names_are_skipped() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let update = RecordUpdate::new()
            .first_name("Mary Ann")
            .last_name("Doe\nID: 99@@xxxxZZ");
        let skipped = apply(&mut record, &update).unwrap();

        assert_eq!(record.full_name(), "John Doe");
        assert!(matches!(
            skipped.as_slice(),
            [
                SkippedChange::InvalidName(ValidationError::FirstNameSpace(_)),
                SkippedChange::InvalidName(ValidationError::LineBreak { .. })
            ]
        ));
    }

    #[test]
    fn test_last_name_with_spaces() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().last_name("van der Berg")).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(record.full_name(), "John van der Berg");
    }

    #[test]
    fn test_even_identifier_is_locked() {
        let mut record = create_test_record("26@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().id("37@#df&*AB")).unwrap();

        assert_eq!(record.id, "26@#df&*AB");
        assert_eq!(
            skipped,
            vec![SkippedChange::IdentifierLocked {
                current: "26@#df&*AB".to_string()
            }]
        );
    }

    #[test]
    fn test_odd_identifier_changes() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().id("77@#df&*CD")).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(record.id, "77@#df&*CD");
    }

    #[test]
    fn test_invalid_new_identifier_is_skipped() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let update = RecordUpdate::new().id("bad").last_name("Smith");
        let skipped = apply(&mut record, &update).unwrap();

        assert_eq!(record.id, "56@#df&*AB");
        assert_eq!(record.last_name, "Smith");
        assert!(matches!(
            skipped.as_slice(),
            [SkippedChange::InvalidIdentifier(ValidationError::IdentifierLength(3))]
        ));
    }

    #[test]
    fn test_taken_identifier_is_skipped() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply_update(
            &mut record,
            &RecordUpdate::new().id("77@#df&*CD"),
            &validator(),
            today(),
            |id| id == "77@#df&*CD",
        )
        .unwrap();

        assert_eq!(record.id, "56@#df&*AB");
        assert_eq!(
            skipped,
            vec![SkippedChange::IdentifierTaken("77@#df&*CD".to_string())]
        );
    }

    #[test]
    fn test_address_change_adult() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let skipped = apply(&mut record, &RecordUpdate::new().address(NEW_ADDRESS)).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(record.address, NEW_ADDRESS);
    }

    #[test]
    fn test_address_change_at_exactly_18() {
        let mut record = create_test_record("56@#df&*AB", "31-12-2008");
        assert!(apply(&mut record, &RecordUpdate::new().address(NEW_ADDRESS)).is_ok());
        assert_eq!(record.address, NEW_ADDRESS);
    }

    #[test]
    fn test_address_change_under_18_fails_whole_update() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2021");
        let original = record.clone();
        let update = RecordUpdate::new().address(NEW_ADDRESS).first_name("Jane");

        assert!(matches!(
            apply(&mut record, &update),
            Err(Error::AddressChangeUnderage { age: 5 })
        ));
        assert_eq!(record, original);
    }

    #[test]
    fn test_invalid_address_is_skipped() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        let bad = "33 | Highland Street | Sydney | New South Wales | Australia";
        let skipped = apply(&mut record, &RecordUpdate::new().address(bad)).unwrap();

        assert_eq!(record.address, ADDRESS);
        assert!(matches!(
            skipped.as_slice(),
            [SkippedChange::InvalidAddress(ValidationError::AddressState { .. })]
        ));
    }

    #[test]
    fn test_demerits_untouched() {
        let mut record = create_test_record("56@#df&*AB", "15-11-2000");
        record
            .demerit_history
            .record(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 4);
        record.is_suspended = true;
        let before = record.demerit_history.clone();

        apply(&mut record, &RecordUpdate::new().first_name("Jake").id("77@#df&*CD")).unwrap();

        assert_eq!(record.demerit_history, before);
        assert!(record.is_suspended);
    }

    #[test]
    fn test_skipped_change_display() {
        let change = SkippedChange::IdentifierTaken("77@#df&*CD".to_string());
        assert!(change.to_string().contains("already in use"));
    }
}
