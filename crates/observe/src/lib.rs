//! Logging setup shared by the binaries and the tests of this workspace.
mod config;
pub mod tracing;

pub use config::Config;
