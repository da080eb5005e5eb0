pub mod driver;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod validation;
pub mod walker;

pub use driver::MirrorDriver;
pub use engine::{MirrorEngine, MirrorProgress};
pub use error::MirrorError;
pub use orchestrator::MirrorOrchestrator;
pub use report::MirrorReport;
pub use validation::validate_mirror_job;
pub use walker::{DirectoryBatch, TreeWalker};
