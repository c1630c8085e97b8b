//! JSON persistence
//!
//! Writes the compiler output document and keeps a ledger of deployments
//! made from this machine.

use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".deployer_data"),
            ledger_file: "deployments.json".to_string(),
        }
    }
}

/// Serialize `value` as pretty JSON, replacing any existing file.
///
/// The document is written to a sibling temp file and renamed into place,
/// so readers never observe a partial write.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StorageError::InvalidData(format!("{:?} is not a file path", path)))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let file = fs::File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    fs::rename(&temp_path, path)?;
    log::debug!("Wrote {:?}", path);
    Ok(())
}

/// Read a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// One confirmed deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: B256,
    pub chain_id: u64,
    pub deployer: Address,
    pub block_number: Option<u64>,
    pub deployed_at: DateTime<Utc>,
}

/// Append-only list of deployments, newest last.
///
/// Informational only: nothing reads it back to skip a deployment.
pub struct DeploymentLedger {
    path: PathBuf,
}

impl DeploymentLedger {
    /// Open the ledger in `config.data_dir`, creating the directory
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            path: config.data_dir.join(&config.ledger_file),
        })
    }

    /// Ledger under `data_dir` with the default file name
    pub fn in_dir(data_dir: &Path) -> Result<Self, StorageError> {
        Self::new(&StorageConfig {
            data_dir: data_dir.to_path_buf(),
            ..Default::default()
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded deployments; empty if nothing was recorded yet
    pub fn list(&self) -> Result<Vec<DeploymentRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_json(&self.path)
    }

    /// Append a deployment
    pub fn record(&self, record: DeploymentRecord) -> Result<(), StorageError> {
        let mut records = self.list()?;
        log::info!(
            "Recording {} at {} (chain {})",
            record.contract_name,
            record.address,
            record.chain_id
        );
        records.push(record);
        write_json(&self.path, &records)
    }

    /// Most recent deployment of `contract_name` on `chain_id`
    pub fn latest(
        &self,
        contract_name: &str,
        chain_id: u64,
    ) -> Result<Option<DeploymentRecord>, StorageError> {
        Ok(self
            .list()?
            .into_iter()
            .rev()
            .find(|r| r.contract_name == contract_name && r.chain_id == chain_id))
    }
}
