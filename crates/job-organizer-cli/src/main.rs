mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use chrono::Local;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use job_organizer_core::schedule::{self, DecisionProvider};
use job_organizer_core::{report, AppConfig, JobOrganizer, OrganizeSummary};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match job_organizer_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Run) => {
            if let Err(err) = run_schedule(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Organize { path }) => {
            if let Err(err) = run_single(&config, &path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Report) => {
            if let Err(err) = run_report(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

/// Organize every pending job on the schedule, then refresh the reports.
fn run_schedule(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let schedule_path = config
        .schedule_path
        .as_deref()
        .ok_or("schedule_path is not configured")?;
    let today = Local::now().date_naive();
    let records = schedule::load_schedule(Path::new(schedule_path), today)?;
    let pending = schedule::pending_jobs(records, today);
    info!("{} pending jobs on the schedule", pending.len());

    let base = Path::new(&config.base_directory);
    let decisions = PromptDecisions;
    let organizer = JobOrganizer::new(config.clone());
    let reporter = CliReporter::new();

    for record in &pending {
        let Some(job_path) = schedule::resolve_job_folder(base, record, &decisions)? else {
            warn!(
                "Skipping job '{}' for client '{}'",
                record.job, record.client
            );
            continue;
        };
        match organizer.organize(&job_path, &reporter) {
            Ok(summary) => print_summary(&job_path, &summary),
            Err(err) => {
                error!("Error organizing '{}': {}", job_path.display(), err);
            }
        }
    }

    run_report(config)
}

fn run_single(config: &AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let organizer = JobOrganizer::new(config.clone());
    let reporter = CliReporter::new();
    let summary = organizer.organize(path, &reporter)?;
    print_summary(path, &summary);
    Ok(())
}

fn run_report(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base = Path::new(&config.base_directory);

    let empty = report::find_empty_jobs(base)?;
    if empty.is_empty() {
        info!("No job folders have all three DRAWINGS, KSS, and ZIP FILES empty.");
    } else {
        info!("Job folders with empty DRAWINGS, KSS, and ZIP FILES:");
        for job in &empty {
            println!("{}", job.display());
        }
    }
    if let Some(report_path) = config.report_path.as_deref() {
        report::write_empty_jobs_report(Path::new(report_path), &empty)?;
        info!("Report written to '{}'", report_path);
    }

    if let Some(schedule_path) = config.schedule_path.as_deref() {
        let today = Local::now().date_naive();
        let records = schedule::load_schedule(Path::new(schedule_path), today)?;
        let unmatched = report::unmatched_folders(base, &records)?;
        if unmatched.is_empty() {
            info!("All folders match the schedule entries.");
        } else {
            info!("Unmatched folders:");
            for folder in &unmatched {
                println!("{}", folder);
            }
        }
    }

    Ok(())
}

fn print_summary(job_path: &Path, summary: &OrganizeSummary) {
    println!();
    info!(
        "{}: {} files moved, {} archives extracted, {} archived whole, {} strays swept in {}",
        job_path.display(),
        format!("{}", summary.files_moved).green(),
        format!("{}", summary.archives_extracted).green(),
        format!("{}", summary.archives_hedged).cyan(),
        format!("{}", summary.strays_swept).cyan(),
        format!("{:.2}s", summary.duration.as_secs_f64()).green(),
    );
    if !summary.is_clean() {
        info!(
            "{} archives failed, {} files skipped — job needs another pass",
            format!("{}", summary.failed_archives.len()).red(),
            format!("{}", summary.skipped.len()).red(),
        );
        for skipped in summary.failed_archives.iter().chain(&summary.skipped) {
            warn!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }
}

/// Interactive decision provider for missing client folders.
struct PromptDecisions;

impl DecisionProvider for PromptDecisions {
    fn approve_client_folder(&self, client: &str) -> bool {
        prompt_confirm(
            &format!("Create a new folder for client '{}'?", client),
            Some(true),
        )
        .unwrap_or(false)
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
