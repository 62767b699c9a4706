//! Drives the Solidity compiler through its `--standard-json` interface and
//! installs compiler releases from the official binary mirror.

mod compiler;
mod installer;
pub mod standard_json;

pub use {
    compiler::Compiler,
    installer::Installer,
    standard_json::{CompiledContract, Input, Output},
};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("solc {version} is not installed at {path:?}")]
    NotInstalled { version: String, path: PathBuf },
    #[error("compilation failed:\n{}", .0.join("\n"))]
    Compilation(Vec<String>),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
