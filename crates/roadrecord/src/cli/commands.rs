//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::record::{Record, RecordUpdate};

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Ten-character person identifier (e.g. "56@#df&*AB")
    #[arg(long)]
    pub id: String,

    /// Given name
    #[arg(long)]
    pub first_name: String,

    /// Family name
    #[arg(long)]
    pub last_name: String,

    /// Address as "number | street | city | state | country"
    #[arg(long)]
    pub address: String,

    /// Birth date as DD-MM-YYYY
    #[arg(long)]
    pub birth_date: String,
}

impl AddCommand {
    /// Build the record to create.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::new(
            self.id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.address.clone(),
            self.birth_date.clone(),
        )
    }
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Identifier of the record to change
    pub id: String,

    /// New identifier (only when the current one starts with an odd digit)
    #[arg(long)]
    pub new_id: Option<String>,

    /// New given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New address (only for people aged 18 or over)
    #[arg(long)]
    pub address: Option<String>,

    /// New birth date as DD-MM-YYYY; cannot be combined with other changes
    #[arg(long)]
    pub birth_date: Option<String>,
}

impl UpdateCommand {
    /// Build the requested field changes.
    #[must_use]
    pub fn to_update(&self) -> RecordUpdate {
        RecordUpdate {
            id: self.new_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            birth_date: self.birth_date.clone(),
        }
    }
}

/// Demerit command arguments.
#[derive(Debug, Args)]
pub struct DemeritCommand {
    /// Identifier of the record
    pub id: String,

    /// Points for the offense (1-6)
    #[arg(short, long, allow_negative_numbers = true)]
    pub points: i64,

    /// Offense date as DD-MM-YYYY
    #[arg(short, long)]
    pub date: String,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Identifier of the record
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_command_to_record() {
        let cmd = AddCommand {
            id: "56@#df&*AB".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            address: "32 | Highland Street | Melbourne | Victoria | Australia".to_string(),
            birth_date: "15-11-2000".to_string(),
        };
        let record = cmd.to_record();
        assert_eq!(record.id, "56@#df&*AB");
        assert_eq!(record.full_name(), "John Doe");
        assert!(record.demerit_history.is_empty());
    }

    #[test]
    fn test_update_command_to_update() {
        let cmd = UpdateCommand {
            id: "56@#df&*AB".to_string(),
            new_id: Some("77@#df&*CD".to_string()),
            first_name: None,
            last_name: Some("Smith".to_string()),
            address: None,
            birth_date: None,
        };
        let update = cmd.to_update();
        assert_eq!(update.id.as_deref(), Some("77@#df&*CD"));
        assert_eq!(update.last_name.as_deref(), Some("Smith"));
        assert!(update.first_name.is_none());
        assert!(!update.is_birth_date_conflict());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
