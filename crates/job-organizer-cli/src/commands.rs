use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "job-organizer")]
#[command(about = "Sorts job folder deliverables into the shop layout", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Organize every pending job on the schedule board
    Run,
    /// Organize a single job folder
    Organize {
        /// Path to the job folder
        path: PathBuf,
    },
    /// Report job folders with empty DRAWINGS, KSS and ZIP FILES
    Report,
    /// Print configuration values
    PrintConfig,
}
