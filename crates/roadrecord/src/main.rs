//! `roadrec` - CLI for roadrecord
//!
//! This binary adds, updates, and inspects personal records in the flat text
//! store and records demerit points against them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;

use roadrecord::cli::{
    AddCommand, Cli, Command, ConfigCommand, DemeritCommand, ShowCommand, UpdateCommand,
};
use roadrecord::{
    init_logging, Config, CreateOutcome, FileStore, Record, RecordManager, Status, UpdateOutcome,
};

type Manager = RecordManager<FileStore>;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(store) = cli.store.clone() {
        config.store.path = Some(store);
    }

    let manager = RecordManager::with_validation(
        FileStore::new(config.store_path()),
        config.validation.clone(),
    );
    let today = Local::now().date_naive();

    match cli.command {
        Command::Add(cmd) => handle_add(&manager, &cmd, today),
        Command::Update(cmd) => handle_update(&manager, &cmd, today),
        Command::Demerit(cmd) => Ok(handle_demerit(&manager, &cmd, today)),
        Command::Show(cmd) => handle_show(&manager, &cmd),
        Command::List(cmd) => handle_list(&manager, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_add(manager: &Manager, cmd: &AddCommand, today: NaiveDate) -> anyhow::Result<ExitCode> {
    match manager.create_record(&cmd.to_record(), today) {
        Ok(CreateOutcome::Inserted) => {
            println!("Added {}", cmd.id);
            Ok(ExitCode::SUCCESS)
        }
        Ok(CreateOutcome::AlreadyPresent) => {
            println!("{} is already stored", cmd.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_validation() => {
            eprintln!("Rejected: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_update(
    manager: &Manager,
    cmd: &UpdateCommand,
    today: NaiveDate,
) -> anyhow::Result<ExitCode> {
    let update = cmd.to_update();
    if update.is_empty() {
        eprintln!("Nothing to update for {}", cmd.id);
        return Ok(ExitCode::FAILURE);
    }

    match manager.update_record(&cmd.id, &update, today) {
        Ok(UpdateOutcome::Updated { record, skipped }) => {
            println!("Updated {}", record.id);
            for change in &skipped {
                println!("  skipped: {change}");
            }
            Ok(ExitCode::SUCCESS)
        }
        // Nothing to change is still a pass.
        Ok(UpdateOutcome::NotFound) => {
            println!("No record with ID {}; nothing updated", cmd.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_validation() => {
            eprintln!("Rejected: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_demerit(manager: &Manager, cmd: &DemeritCommand, today: NaiveDate) -> ExitCode {
    let result = manager.add_demerit_points(&cmd.id, cmd.points, &cmd.date, today);
    let status = Status::from(&result);

    match &result {
        Ok(outcome) => {
            println!("{status}");
            println!(
                "  {} points in the last two years{}",
                outcome.assessment.points_in_window,
                if outcome.assessment.suspended {
                    ", suspended"
                } else {
                    ""
                }
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{status}");
            eprintln!("  {err}");
            ExitCode::FAILURE
        }
    }
}

fn handle_show(manager: &Manager, cmd: &ShowCommand) -> anyhow::Result<ExitCode> {
    let Some(record) = manager.get_record(&cmd.id)? else {
        eprintln!("No record with ID {}", cmd.id);
        return Ok(ExitCode::FAILURE);
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list(manager: &Manager, json: bool) -> anyhow::Result<ExitCode> {
    let records = manager.list_records()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No records in {}", manager.store().path().display());
    } else {
        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_record(record);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_record(record: &Record) {
    println!("{}  {}", record.id, record.full_name());
    println!("  Address:    {}", record.address);
    println!("  Birth date: {}", record.birth_date);
    if record.demerit_history.is_empty() {
        println!("  Demerits:   none");
    } else {
        println!("  Demerits:");
        for (date, points) in record.demerit_history.iter() {
            println!("    {date}  {points}");
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Path:          {}", config.store_path().display());
                println!();
                println!("[Validation]");
                println!("  Jurisdiction:  {}", config.validation.jurisdiction);
                match config.validation.max_year {
                    Some(year) => println!("  Max year:      {year}"),
                    None => println!("  Max year:      current year"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                println!("Configuration error: {e}");
                return Ok(ExitCode::FAILURE);
            }
            println!("Configuration is valid.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_command(id: &str) -> UpdateCommand {
        UpdateCommand {
            id: id.to_string(),
            new_id: None,
            first_name: None,
            last_name: Some("Smith".to_string()),
            address: None,
            birth_date: None,
        }
    }

    #[test]
    fn test_update_unknown_id_exits_success() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RecordManager::new(FileStore::new(dir.path().join("person.txt")));
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let code = handle_update(&manager, &update_command("77@#df&*CD"), today).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(manager.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_update_without_changes_exits_failure() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RecordManager::new(FileStore::new(dir.path().join("person.txt")));
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let mut cmd = update_command("77@#df&*CD");
        cmd.last_name = None;
        let code = handle_update(&manager, &cmd, today).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
