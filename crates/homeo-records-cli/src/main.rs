mod commands;
mod config;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use homeo_records_core::{
    generate_case_no, Database, FollowupEntry, PatientService, RecordError, SaveOutcome,
    SearchQuery,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

use config::Config;

/// Homeopathy patient records: save, view and delete case records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file (default: ~/.homeo-records/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// App password
    #[arg(long, env = "HOMEO_RECORDS_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh case number for a new form
    NewCaseNo,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Save a patient form from a JSON file ("-" reads stdin)
    Save {
        #[arg(short, long)]
        form: PathBuf,

        /// Case number that was opened for editing before the form was filled in
        #[arg(long)]
        loaded: Option<String>,
    },

    /// Add a follow-up visit to an existing record
    FollowUp {
        #[arg(long)]
        case_no: String,

        /// Visit date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        prescription: String,

        #[arg(long, default_value = "")]
        status: String,

        #[arg(long)]
        medicine_days: Option<u32>,
    },

    /// Show a record by case number, or all records with a name
    Show(Target),

    /// Delete a record by case number, or all records with a name
    Delete(Target),
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    #[arg(long)]
    case_no: Option<String>,

    /// Exact full name
    #[arg(long)]
    name: Option<String>,
}

impl Target {
    fn query(&self) -> SearchQuery {
        match (&self.case_no, &self.name) {
            (Some(case_no), _) => SearchQuery::CaseNo(case_no.clone()),
            (None, Some(name)) => SearchQuery::Name(name.clone()),
            (None, None) => unreachable!("clap requires --case-no or --name"),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = match args.config {
        Some(ref path) => path.clone(),
        None => Config::default_config_path()?,
    };
    debug!("Using config file {}", config_path.display());

    match &args.command {
        Command::NewCaseNo => {
            println!("{}", generate_case_no());
            return Ok(ExitCode::SUCCESS);
        }
        Command::InitConfig { force } => {
            if config_path.exists() && !force {
                warn!("Config file {} already exists (use --force)", config_path.display());
                return Ok(ExitCode::FAILURE);
            }
            Config::default().save(&config_path)?;
            info!("Wrote {}", config_path.display());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = Config::load(&config_path)?;
    let gate = config.access_gate()?;
    if !gate.is_open() {
        let password = args.password.as_deref().unwrap_or_default();
        if let Err(e) = gate.verify(password) {
            eprintln!("{}. Please enter the correct app password.", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    let db_path = config.get_database_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open record database {}", db_path.display()))?;
    let store = db.collection(&config.collection);
    let service = PatientService::new(&store);

    let result = match args.command {
        Command::Save { form, loaded } => {
            let form = commands::read_form(&form)?;
            commands::save_form(&service, &form, loaded.as_deref()).map(report_saved)
        }
        Command::FollowUp {
            case_no,
            date,
            description,
            prescription,
            status,
            medicine_days,
        } => {
            let entry = FollowupEntry {
                followup_date: date,
                description,
                prescription,
                status,
                medicine_days,
            };
            commands::add_followup(&service, &case_no, entry).map(report_saved)
        }
        Command::Show(target) => {
            commands::show(&service, &target.query()).map(|json| println!("{}", json))
        }
        Command::Delete(target) => commands::delete(&service, &target.query())
            .map(|count| println!("Deleted {} record(s)", count)),
        Command::NewCaseNo | Command::InitConfig { .. } => Ok(()),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(RecordError::NotFound(what)) => {
            eprintln!("No record found for {}.", what);
            Ok(ExitCode::FAILURE)
        }
        Err(RecordError::Validation(msg)) => {
            eprintln!("{}", msg);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e).context("Record operation failed"),
    }
}

fn report_saved(outcome: SaveOutcome) {
    let verb = if outcome.created { "created" } else { "updated" };
    println!("Record {} for Case#: {}", verb, outcome.case_no);
    if outcome.followup_appended {
        println!("Follow-up added ({} total)", outcome.followup_count);
    }
}
