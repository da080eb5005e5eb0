pub mod models;

pub use models::{LogRotation, MirrorConfig, MirrorJob};
