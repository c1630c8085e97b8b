//! Contract source loading

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source loading errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Source file {0:?} is empty")]
    Empty(PathBuf),
    #[error("Source path {0:?} has no file name")]
    NoFileName(PathBuf),
}

/// Solidity source text keyed by the file name the compiler will see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSource {
    pub file_name: String,
    pub content: String,
}

impl ContractSource {
    /// Create a source from in-memory text
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Contract name implied by the file name (`SimpleStorage.sol` -> `SimpleStorage`)
    pub fn default_contract_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Read a UTF-8 contract source file
pub fn load_source(path: &Path) -> Result<ContractSource, SourceError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SourceError::NoFileName(path.to_path_buf()))?
        .to_string();

    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Err(SourceError::Empty(path.to_path_buf()));
    }

    log::debug!("Loaded {} ({} bytes)", file_name, content.len());
    Ok(ContractSource { file_name, content })
}
