pub mod config;
pub mod core;
pub mod observability;
pub mod signals;

pub use anyhow::{Context, Result};
