//! Run configuration
//!
//! Everything that varies between environments lives here. The signing key
//! is deliberately absent: it is read from the environment at the call site
//! and handed to the session that signs.

use crate::chain::DEFAULT_POLL_INTERVAL;
use crate::contract::DEFAULT_SOLC_VERSION;
use crate::storage::StorageConfig;
use alloy_primitives::Address;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local development node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Deployment and interaction settings
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub rpc_url: String,
    /// Expected chain id; queried from the node when unset
    pub chain_id: Option<u64>,
    /// Expected sender; must match the signing key when set
    pub sender: Option<Address>,
    pub source_path: PathBuf,
    /// Contract to extract; defaults to the source file stem
    pub contract_name: Option<String>,
    pub solc_version: String,
    pub solc_path: Option<PathBuf>,
    /// Where the full compiler output is written
    pub output_path: PathBuf,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub receipt_timeout: Option<Duration>,
    pub getter: String,
    pub setter: String,
    pub store_value: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            sender: None,
            source_path: PathBuf::from("SimpleStorage.sol"),
            contract_name: None,
            solc_version: DEFAULT_SOLC_VERSION.to_string(),
            solc_path: None,
            output_path: PathBuf::from("compiled_code.json"),
            data_dir: StorageConfig::default().data_dir,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_timeout: None,
            getter: "retrieve".to_string(),
            setter: "store".to_string(),
            store_value: "15".to_string(),
        }
    }
}

impl DeployConfig {
    /// Contract name to extract from the compiler output
    pub fn contract_name(&self) -> String {
        self.contract_name
            .clone()
            .unwrap_or_else(|| file_stem(&self.source_path))
    }

    /// Storage settings for the deployment ledger
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            data_dir: self.data_dir.clone(),
            ..Default::default()
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeployConfig::default();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.solc_version, "0.6.0");
        assert_eq!(config.contract_name(), "SimpleStorage");
        assert_eq!(config.store_value, "15");
        assert!(config.receipt_timeout.is_none());
    }

    #[test]
    fn test_contract_name_override() {
        let config = DeployConfig {
            source_path: PathBuf::from("contracts/Storage.sol"),
            ..Default::default()
        };
        assert_eq!(config.contract_name(), "Storage");

        let config = DeployConfig {
            contract_name: Some("SimpleStorage".to_string()),
            ..config
        };
        assert_eq!(config.contract_name(), "SimpleStorage");
    }
}
