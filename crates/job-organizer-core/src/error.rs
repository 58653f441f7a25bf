use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] csv::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Archive entry '{name}' escapes the extraction directory")]
    UnsafeEntry { name: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}
