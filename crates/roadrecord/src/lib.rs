//! `roadrecord` - A personal record and demerit point registry
//!
//! This library validates personal records, keeps them in a flat text store,
//! applies restricted field updates, and tracks demerit points against a
//! two-year suspension window.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod demerit;
pub mod error;
pub mod logging;
pub mod manager;
pub mod policy;
pub mod record;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use demerit::DemeritAssessment;
pub use error::{Error, Result, ValidationError};
pub use logging::init_logging;
pub use manager::{CreateOutcome, DemeritOutcome, RecordManager, Status, UpdateOutcome};
pub use policy::SkippedChange;
pub use record::{DemeritHistory, Record, RecordUpdate};
pub use storage::{FileStore, MemoryStore, RecordStore};
pub use validation::Validator;
