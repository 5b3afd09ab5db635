//! Field format validators.
//!
//! Pure, stateless checks over raw strings. Each check returns the reason a
//! value was rejected; the `is_valid_*` helpers collapse that into a plain
//! pass/fail for callers that only need the boolean.
//!
//! # Example
//!
//! ```
//! use roadrecord::validation::{check_address, check_date, check_identifier};
//!
//! assert!(check_identifier("56@#df&*AB").is_ok());
//! assert!(check_address("32 | Highland Street | Melbourne | Victoria | Australia", "Victoria").is_ok());
//! assert!(check_date("15-11-1990", 2025).is_ok());
//! assert!(check_date("15/11/1990", 2025).is_err());
//! ```

use chrono::{Datelike, NaiveDate};

use crate::config::ValidationConfig;
use crate::error::ValidationError;

/// Required identifier length, in characters.
pub const IDENTIFIER_LEN: usize = 10;

/// Minimum number of non-alphanumeric characters in the identifier's middle window.
pub const MIN_SPECIAL_CHARS: usize = 2;

/// Delimiter between address segments.
pub const ADDRESS_DELIMITER: &str = " | ";

/// Number of segments in an address.
pub const ADDRESS_SEGMENTS: usize = 5;

/// Default jurisdiction an address state must match.
pub const DEFAULT_JURISDICTION: &str = "Victoria";

/// Check that a field value fits on a single store line.
///
/// # Errors
///
/// Returns [`ValidationError::LineBreak`] if `value` holds `'\n'` or `'\r'`.
pub fn check_single_line(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreak { field });
    }
    Ok(())
}

/// Check a first name.
///
/// The name line holds `<first> <last>` and is split at the first space when
/// read back, so a first name cannot itself contain a space.
///
/// # Errors
///
/// Returns an error for a line break or a space.
pub fn check_first_name(first_name: &str) -> Result<(), ValidationError> {
    check_single_line("first name", first_name)?;
    if first_name.contains(' ') {
        return Err(ValidationError::FirstNameSpace(first_name.to_string()));
    }
    Ok(())
}

/// Check a last name. Spaces are allowed.
///
/// # Errors
///
/// Returns an error for a line break.
pub fn check_last_name(last_name: &str) -> Result<(), ValidationError> {
    check_single_line("last name", last_name)
}

/// Check a person identifier.
///
/// The identifier must be exactly 10 characters; the first two must be
/// digits between 2 and 9; positions 2 through 9 (1-based) must hold at least
/// two characters that are neither letters nor digits; and the last two must
/// be uppercase letters.
///
/// # Errors
///
/// Returns the first rule the identifier breaks.
pub fn check_identifier(id: &str) -> Result<(), ValidationError> {
    check_single_line("identifier", id)?;
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != IDENTIFIER_LEN {
        return Err(ValidationError::IdentifierLength(chars.len()));
    }

    for (position, c) in chars.iter().take(2).enumerate() {
        if !('2'..='9').contains(c) {
            return Err(ValidationError::IdentifierPrefix {
                position: position + 1,
            });
        }
    }

    let special = chars[1..9]
        .iter()
        .filter(|c| !c.is_alphanumeric())
        .count();
    if special < MIN_SPECIAL_CHARS {
        return Err(ValidationError::IdentifierSpecialChars(special));
    }

    if !chars[8..].iter().all(|c| c.is_uppercase()) {
        return Err(ValidationError::IdentifierSuffix);
    }

    Ok(())
}

/// Check an address of the form `number | street | city | state | country`.
///
/// # Errors
///
/// Returns an error if the address holds a line break, the segment count is
/// wrong, the state does not equal `jurisdiction`, or the street number is
/// not an integer.
pub fn check_address(address: &str, jurisdiction: &str) -> Result<(), ValidationError> {
    check_single_line("address", address)?;
    // Empty segments count, so a trailing delimiter adds a segment.
    let segments: Vec<&str> = address.split(ADDRESS_DELIMITER).collect();
    if segments.len() != ADDRESS_SEGMENTS {
        return Err(ValidationError::AddressSegments(segments.len()));
    }

    if segments[3] != jurisdiction {
        return Err(ValidationError::AddressState {
            expected: jurisdiction.to_string(),
            actual: segments[3].to_string(),
        });
    }

    if segments[0].parse::<i32>().is_err() {
        return Err(ValidationError::StreetNumber(segments[0].to_string()));
    }

    Ok(())
}

/// The numeric components of a `DD-MM-YYYY` date.
///
/// Day-of-month is not checked against the month length; use
/// [`DateParts::to_naive_date`] when a real calendar date is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    /// Day of month, 1-31.
    pub day: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Year, 1 up to the configured bound.
    pub year: i32,
}

impl DateParts {
    /// Convert to a calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotACalendarDate`] for dates such as 31-02.
    pub fn to_naive_date(self) -> Result<NaiveDate, ValidationError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ValidationError::NotACalendarDate(format!(
                "{:02}-{:02}-{:04}",
                self.day, self.month, self.year
            ))
        })
    }
}

/// Parse a `DD-MM-YYYY` date, enforcing component ranges.
///
/// # Errors
///
/// Returns an error if the string does not have exactly three numeric
/// components, or if a component is out of range.
pub fn parse_date(date: &str, max_year: i32) -> Result<DateParts, ValidationError> {
    // Empty components count, so "15-11-1990-" has four and is rejected.
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 {
        return Err(ValidationError::DateFormat(date.to_string()));
    }

    let mut numbers = [0_i64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<i64>()
            .map_err(|_| ValidationError::DateFormat(date.to_string()))?;
    }
    let [day, month, year] = numbers;

    if !(1..=12).contains(&month) {
        return Err(ValidationError::MonthOutOfRange(month));
    }
    if !(1..=31).contains(&day) {
        return Err(ValidationError::DayOutOfRange(day));
    }
    if year < 1 || year > i64::from(max_year) {
        return Err(ValidationError::YearOutOfRange {
            year,
            max: max_year,
        });
    }

    // Ranges above guarantee these conversions succeed.
    Ok(DateParts {
        day: u32::try_from(day).unwrap_or_default(),
        month: u32::try_from(month).unwrap_or_default(),
        year: i32::try_from(year).unwrap_or_default(),
    })
}

/// Check a `DD-MM-YYYY` date.
///
/// # Errors
///
/// See [`parse_date`].
pub fn check_date(date: &str, max_year: i32) -> Result<(), ValidationError> {
    parse_date(date, max_year).map(|_| ())
}

/// Returns `true` if the identifier passes [`check_identifier`].
#[must_use]
pub fn is_valid_identifier(id: &str) -> bool {
    check_identifier(id).is_ok()
}

/// Returns `true` if the address passes [`check_address`].
#[must_use]
pub fn is_valid_address(address: &str, jurisdiction: &str) -> bool {
    check_address(address, jurisdiction).is_ok()
}

/// Returns `true` if the date passes [`check_date`].
#[must_use]
pub fn is_valid_date(date: &str, max_year: i32) -> bool {
    check_date(date, max_year).is_ok()
}

/// Validators bound to a jurisdiction and a year bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    jurisdiction: String,
    max_year: i32,
}

impl Validator {
    /// Create a validator with an explicit jurisdiction and year bound.
    #[must_use]
    pub fn new(jurisdiction: impl Into<String>, max_year: i32) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            max_year,
        }
    }

    /// Build a validator from configuration.
    ///
    /// Without a configured `max_year`, the bound is the year of `today`.
    #[must_use]
    pub fn from_config(config: &ValidationConfig, today: NaiveDate) -> Self {
        Self::new(
            config.jurisdiction.clone(),
            config.max_year.unwrap_or_else(|| today.year()),
        )
    }

    /// The jurisdiction an address state must equal.
    #[must_use]
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// The largest accepted year.
    #[must_use]
    pub fn max_year(&self) -> i32 {
        self.max_year
    }

    /// Check an identifier.
    ///
    /// # Errors
    ///
    /// See [`check_identifier`].
    pub fn identifier(&self, id: &str) -> Result<(), ValidationError> {
        check_identifier(id)
    }

    /// Check an address against this validator's jurisdiction.
    ///
    /// # Errors
    ///
    /// See [`check_address`].
    pub fn address(&self, address: &str) -> Result<(), ValidationError> {
        check_address(address, &self.jurisdiction)
    }

    /// Check a date against this validator's year bound.
    ///
    /// # Errors
    ///
    /// See [`check_date`].
    pub fn date(&self, date: &str) -> Result<(), ValidationError> {
        check_date(date, self.max_year)
    }

    /// Parse a date into a calendar date, applying this validator's bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the format check fails or the date does not exist.
    pub fn calendar_date(&self, date: &str) -> Result<NaiveDate, ValidationError> {
        parse_date(date, self.max_year)?.to_naive_date()
    }
}
