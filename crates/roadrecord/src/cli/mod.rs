//! Command-line interface for roadrecord.
//!
//! This module provides the CLI structure for the `roadrec` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DemeritCommand, ListCommand, ShowCommand, UpdateCommand,
};

use crate::logging::Verbosity;

/// roadrec - Personal records and demerit points
///
/// Validates and stores personal records in a flat text file, applies
/// restricted field updates, and tracks demerit points with a two-year
/// suspension window.
#[derive(Debug, Parser)]
#[command(name = "roadrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the record store (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new record
    Add(AddCommand),

    /// Change fields of an existing record
    Update(UpdateCommand),

    /// Add demerit points for an offense
    Demerit(DemeritCommand),

    /// Show one record
    Show(ShowCommand),

    /// List all records
    List(ListCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
