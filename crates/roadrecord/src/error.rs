//! Error types for roadrecord.
//!
//! Every operation in this crate resolves to pass (`Ok`) or fail (`Err`).
//! Failures fall into two classes: validation failures, which carry a
//! [`ValidationError`] describing the rejected input, and store failures,
//! which wrap the underlying I/O error. Neither class is fatal; a caller can
//! always retry with corrected input.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roadrecord operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// Input failed a format or range check.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A birth date change was requested together with other field changes.
    #[error("a birth date change cannot be combined with other field changes")]
    BirthDateNotExclusive,

    /// An address change was requested for a person under 18.
    #[error("address cannot be changed for a person aged {age} (must be 18 or older)")]
    AddressChangeUnderage {
        /// Age computed from the stored birth year.
        age: i32,
    },

    /// No stored record carries the identifier.
    #[error("no record found with identifier {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    // === Store Errors ===
    /// The record store could not be read.
    #[error("failed to read record store at {path}: {source}")]
    StoreRead {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The record store could not be written.
    #[error("failed to write record store at {path}: {source}")]
    StoreWrite {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored record block could not be decoded.
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number where the problem was found.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// Why a field value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is not exactly 10 characters long.
    #[error("identifier must be exactly 10 characters, got {0}")]
    IdentifierLength(usize),

    /// One of the first two identifier characters is not a digit in 2..=9.
    #[error("identifier character {position} must be a digit between 2 and 9")]
    IdentifierPrefix {
        /// 1-based position of the offending character.
        position: usize,
    },

    /// Too few special characters in the identifier's middle window.
    #[error("identifier needs at least 2 special characters in positions 2-9, found {0}")]
    IdentifierSpecialChars(usize),

    /// The last two identifier characters are not both uppercase letters.
    #[error("identifier must end with two uppercase letters")]
    IdentifierSuffix,

    /// Address does not split into exactly five segments.
    #[error("address must have 5 segments separated by \" | \", got {0}")]
    AddressSegments(usize),

    /// Address state does not match the jurisdiction.
    #[error("address state must be {expected}, got {actual}")]
    AddressState {
        /// The configured jurisdiction.
        expected: String,
        /// The state found in the address.
        actual: String,
    },

    /// Street number is not an integer.
    #[error("street number must be an integer, got {0:?}")]
    StreetNumber(String),

    /// Date does not split into three numeric components.
    #[error("date must be DD-MM-YYYY with numeric components, got {0:?}")]
    DateFormat(String),

    /// Day is outside 1..=31.
    #[error("day {0} is out of range 1-31")]
    DayOutOfRange(i64),

    /// Month is outside 1..=12.
    #[error("month {0} is out of range 1-12")]
    MonthOutOfRange(i64),

    /// Year is outside 1..=max.
    #[error("year {year} is out of range 1-{max}")]
    YearOutOfRange {
        /// The rejected year.
        year: i64,
        /// The upper bound in force.
        max: i32,
    },

    /// Date passed the format check but does not exist on the calendar.
    #[error("{0} is not a calendar date")]
    NotACalendarDate(String),

    /// A field holds a line break, which would split its store line.
    #[error("{field} must fit on one line")]
    LineBreak {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A first name holds a space, which the name line cannot round-trip.
    #[error("first name must not contain spaces, got {0:?}")]
    FirstNameSpace(String),

    /// Demerit points outside 1..=6.
    #[error("demerit points must be between 1 and 6, got {0}")]
    PointsOutOfRange(i64),
}

/// A specialized Result type for roadrecord operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for an identifier.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Check if this error rejects the caller's input rather than reporting
    /// a store or configuration problem.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::BirthDateNotExclusive
                | Self::AddressChangeUnderage { .. }
                | Self::NotFound { .. }
        )
    }

    /// Check if this error came from reading or writing the store.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. } | Self::StoreWrite { .. } | Self::MalformedRecord { .. }
        )
    }
}
