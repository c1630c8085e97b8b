//! Storage module for compiler output and the deployment ledger

pub mod persistence;

pub use persistence::{
    read_json, write_json, DeploymentLedger, DeploymentRecord, StorageConfig, StorageError,
};
