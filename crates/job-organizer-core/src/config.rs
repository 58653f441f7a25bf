use crate::mover::CollisionPolicy;
use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the client folders.
    pub base_directory: String,
    /// Worker pool size for zip member extraction.
    pub worker_threads: usize,
    /// What to do when a classified file's destination name is taken.
    pub collision_policy: CollisionPolicy,
    /// Companion tool staged into each finished job folder, if present.
    pub companion_executable: Option<String>,
    /// Template spreadsheet staged into MATERIAL, if present.
    pub template_spreadsheet: Option<String>,
    /// Schedule CSV with (client, job, due date, bill status) rows.
    pub schedule_path: Option<String>,
    /// Where the empty-folders report is written.
    pub report_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_directory: ".".to_string(),
            worker_threads: 32,
            collision_policy: CollisionPolicy::default(),
            companion_executable: None,
            template_spreadsheet: None,
            schedule_path: None,
            report_path: None,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
