use crate::error::Error;
use chrono::{Datelike, Duration, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

// Schedule CSV column layout, matching the shop's board export.
const CLIENT_COLUMN: usize = 0;
const JOB_COLUMN: usize = 1;
const DUE_DATE_COLUMN: usize = 3;
const BILL_STATUS_COLUMN: usize = 11;

const DUE_DATE_FORMAT: &str = "%m/%d/%Y";

/// One row of the schedule board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub client: String,
    pub job: String,
    pub due_date: NaiveDate,
    pub billed: bool,
}

impl JobRecord {
    /// `client/job` key used to reconcile folders against the schedule.
    pub fn folder_key(&self) -> String {
        format!("{}/{}", self.client, self.job)
    }
}

/// Policy for decisions the engine must not block on. The default
/// implementation auto-creates; the CLI supplies an interactive one.
pub trait DecisionProvider: Send + Sync {
    fn approve_client_folder(&self, client: &str) -> bool;
}

/// Fail-open default: missing client folders are created without asking.
pub struct AutoCreate;

impl DecisionProvider for AutoCreate {
    fn approve_client_folder(&self, _client: &str) -> bool {
        true
    }
}

/// Read the schedule CSV. The header row is skipped, blank client cells end
/// a row's usefulness, blank job cells fall back to "Reserve", and job names
/// are sanitized before they can become folder names. A malformed due date
/// falls back to `today` rather than dropping the row.
pub fn load_schedule(path: &Path, today: NaiveDate) -> Result<Vec<JobRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let client = row.get(CLIENT_COLUMN).unwrap_or("").trim().to_string();
        if client.is_empty() {
            continue;
        }

        let raw_job = row.get(JOB_COLUMN).unwrap_or("").trim();
        let job = if raw_job.is_empty() {
            "Reserve".to_string()
        } else {
            sanitize_job_name(raw_job)
        };

        let raw_due = row.get(DUE_DATE_COLUMN).unwrap_or("").trim();
        let due_date = match NaiveDate::parse_from_str(raw_due, DUE_DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                if !raw_due.is_empty() {
                    warn!("Unparseable due date '{}' for '{}', assuming today", raw_due, client);
                }
                today
            }
        };

        let billed = row
            .get(BILL_STATUS_COLUMN)
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case("billed");

        records.push(JobRecord {
            client,
            job,
            due_date,
            billed,
        });
    }
    Ok(records)
}

/// Jobs still worth touching: not billed, due after the start of the current
/// week.
pub fn pending_jobs(records: Vec<JobRecord>, today: NaiveDate) -> Vec<JobRecord> {
    let cutoff = week_start(today);
    records
        .into_iter()
        .filter(|record| !record.billed)
        .filter(|record| record.due_date > cutoff)
        .collect()
}

/// Monday of the week containing `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Strip characters that would mangle a folder name.
pub fn sanitize_job_name(name: &str) -> String {
    name.chars().filter(|c| !"?.!/;:".contains(*c)).collect()
}

/// Resolve the job folder for a record under `base`, creating the client
/// folder when the decision provider approves. `None` means the job was
/// declined and should be skipped.
pub fn resolve_job_folder(
    base: &Path,
    record: &JobRecord,
    decisions: &dyn DecisionProvider,
) -> io::Result<Option<PathBuf>> {
    let client_dir = base.join(&record.client);
    if !client_dir.exists() {
        if !decisions.approve_client_folder(&record.client) {
            return Ok(None);
        }
        fs::create_dir_all(&client_dir)?;
    }
    Ok(Some(client_dir.join(&record.job)))
}
