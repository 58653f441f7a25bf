pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod job;
pub mod mover;
pub mod organizer;
pub mod progress;
pub mod report;
pub mod resources;
pub mod schedule;
pub mod taxonomy;

pub use config::AppConfig;
pub use error::Error;
pub use job::JobFolder;
pub use mover::CollisionPolicy;
pub use organizer::{JobOrganizer, OrganizeSummary};
pub use progress::{ProgressReporter, SilentReporter};
pub use taxonomy::{Destination, Taxonomy};
