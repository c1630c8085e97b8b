//! Failure type for the compile/deploy/interact pipeline
//!
//! Every module has its own error enum; [`DeployError`] wraps them together
//! with the [`Stage`] that failed so the caller can report where the run
//! stopped and whether trying again could help.

use crate::chain::ChainError;
use crate::contract::{CompilerError, SourceError};
use crate::crypto::SigningError;
use crate::storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Pipeline step a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    LoadSource,
    Compile,
    WriteOutput,
    LoadOutput,
    QueryChainId,
    QueryNonce,
    QueryGasPrice,
    Build,
    Sign,
    Broadcast,
    AwaitReceipt,
    Call,
    Record,
    LoadLedger,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::LoadSource => "load source",
            Stage::Compile => "compile",
            Stage::WriteOutput => "write output",
            Stage::LoadOutput => "load compiler output",
            Stage::QueryChainId => "query chain id",
            Stage::QueryNonce => "query nonce",
            Stage::QueryGasPrice => "query gas price",
            Stage::Build => "build transaction",
            Stage::Sign => "sign",
            Stage::Broadcast => "broadcast",
            Stage::AwaitReceipt => "await receipt",
            Stage::Call => "call",
            Stage::Record => "record deployment",
            Stage::LoadLedger => "load deployment ledger",
        };
        f.write_str(name)
    }
}

/// A pipeline failure and the stage that produced it
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("{stage}: {message}")]
    Config { stage: Stage, message: String },
    #[error("load source: {0}")]
    Source(#[from] SourceError),
    #[error("compile: {0}")]
    Compilation(#[from] CompilerError),
    #[error("{stage}: network error: {message}")]
    Network { stage: Stage, message: String },
    #[error("{stage}: node rejected request ({code}): {message}")]
    Rpc {
        stage: Stage,
        code: i64,
        message: String,
    },
    #[error("{stage}: {cause}")]
    Signing {
        stage: Stage,
        #[source]
        cause: SigningError,
    },
    #[error("{stage}: {cause}")]
    Chain {
        stage: Stage,
        #[source]
        cause: ChainError,
    },
    #[error("{stage}: {cause}")]
    Storage {
        stage: Stage,
        #[source]
        cause: StorageError,
    },
}

impl DeployError {
    /// Attribute a chain client failure to `stage`
    pub fn chain(stage: Stage, err: ChainError) -> Self {
        match err {
            ChainError::Network(message) => DeployError::Network { stage, message },
            ChainError::Rpc { code, message } => DeployError::Rpc {
                stage,
                code,
                message,
            },
            ChainError::Signing(cause) => DeployError::Signing { stage, cause },
            cause => DeployError::Chain { stage, cause },
        }
    }

    pub fn signing(cause: impl Into<SigningError>) -> Self {
        DeployError::Signing {
            stage: Stage::Sign,
            cause: cause.into(),
        }
    }

    pub fn storage(stage: Stage, cause: StorageError) -> Self {
        DeployError::Storage { stage, cause }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DeployError::Config {
            stage: Stage::Configure,
            message: message.into(),
        }
    }

    /// Stage at which the pipeline stopped
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::Source(_) => Stage::LoadSource,
            DeployError::Compilation(_) => Stage::Compile,
            DeployError::Config { stage, .. }
            | DeployError::Network { stage, .. }
            | DeployError::Rpc { stage, .. }
            | DeployError::Signing { stage, .. }
            | DeployError::Chain { stage, .. }
            | DeployError::Storage { stage, .. } => *stage,
        }
    }

    /// Whether the same step could succeed if attempted again.
    ///
    /// Only transport failures and receipt timeouts qualify. Nothing in this
    /// crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployError::Network { .. } => true,
            DeployError::Chain { cause, .. } => cause.is_retryable(),
            _ => false,
        }
    }
}

/// Tag a chain client result with the stage it belongs to
pub trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, DeployError>;
}

impl<T> StageExt<T> for Result<T, ChainError> {
    fn at(self, stage: Stage) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::chain(stage, e))
    }
}
