//! Solidity compiler adapter
//!
//! Resolves a `solc` of the pinned version through `foundry-compilers`,
//! installing it into the svm directory when it is missing, and compiles
//! through the standard-JSON interface. A binary reporting any other version
//! is rejected rather than silently used.

use crate::contract::artifact::CompiledArtifact;
use crate::contract::source::ContractSource;
use foundry_compilers::artifacts::output_selection::OutputSelection;
use foundry_compilers::artifacts::{
    CompilerOutput, Settings, SolcInput, SolcLanguage, Source, Sources,
};
use foundry_compilers::solc::Solc;
use semver::Version;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Compiler version the bundled contract targets
pub const DEFAULT_SOLC_VERSION: &str = "0.6.0";

/// Outputs requested for every contract
pub const OUTPUT_SELECTION: [&str; 4] = ["abi", "metadata", "evm.bytecode", "evm.sourceMap"];

/// Compiler errors
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Invalid compiler version {0:?}")]
    InvalidVersion(String),
    #[error("solc {version} could not be found or installed: {reason}")]
    MissingToolchain { version: String, reason: String },
    #[error("Compiler at {path:?} is unusable: {reason}")]
    UnusableCompiler { path: PathBuf, reason: String },
    #[error("Compiler at {path:?} reports version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("Compilation failed:\n{0}")]
    Solc(String),
    #[error("Contract {contract} not found in output for {file}")]
    ContractNotFound { file: String, contract: String },
    #[error("Contract {0} has no bytecode")]
    EmptyBytecode(String),
    #[error("Contract {0} references unlinked libraries")]
    UnlinkedLibraries(String),
    #[error("Invalid compiler output: {0}")]
    InvalidOutput(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result of a successful compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Full standard-JSON output (abi, metadata, bytecode, source map)
    pub output: Value,
    pub artifact: CompiledArtifact,
}

/// A `solc` binary of a known version
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    solc: Solc,
}

impl SolcCompiler {
    /// Locate or install a compiler reporting exactly `version`.
    ///
    /// An explicit path is the only candidate when given and is never
    /// replaced by a download. Otherwise the svm install directory is
    /// searched and the release is installed there if absent.
    pub fn resolve(version: &str, explicit: Option<&Path>) -> Result<Self, CompilerError> {
        let expected = parse_version(version)?;

        let solc = match explicit {
            Some(path) => Solc::new(path).map_err(|e| CompilerError::UnusableCompiler {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?,
            None => {
                log::debug!("Looking up solc {} in the svm directory", expected);
                Solc::find_or_install(&expected).map_err(|e| CompilerError::MissingToolchain {
                    version: version.to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        check_version(&solc.solc, &solc.version, &expected)?;
        log::info!("Using solc {} at {:?}", expected, solc.solc);
        Ok(Self { solc })
    }

    /// Path of the compiler binary
    pub fn binary(&self) -> &Path {
        &self.solc.solc
    }

    /// Compiler release, without build metadata
    pub fn version(&self) -> Version {
        release(&self.solc.version)
    }

    /// Compile a source and extract `contract_name`
    pub fn compile(
        &self,
        source: &ContractSource,
        contract_name: &str,
    ) -> Result<Compilation, CompilerError> {
        let input = standard_input(source);
        let raw = self
            .solc
            .compile_output(&input)
            .map_err(|e| CompilerError::Solc(e.to_string()))?;
        let output: Value = serde_json::from_slice(&raw)?;

        for warning in check_diagnostics(&output)? {
            log::warn!("solc: {}", warning.trim_end());
        }

        let artifact =
            CompiledArtifact::from_standard_output(&output, &source.file_name, contract_name)?;
        log::info!(
            "Compiled {} with solc {}: {} bytes of bytecode, {} function(s)",
            contract_name,
            self.version(),
            artifact.bytecode.len(),
            artifact.abi.functions().count()
        );

        Ok(Compilation { output, artifact })
    }
}

/// Standard-JSON input compiling a single source with the fixed output selection
pub fn standard_input(source: &ContractSource) -> SolcInput {
    let mut sources = Sources::new();
    sources.insert(
        PathBuf::from(&source.file_name),
        Source::new(source.content.clone()),
    );

    let mut settings = Settings::default();
    settings.output_selection = OutputSelection::common_output_selection(OUTPUT_SELECTION.map(String::from));
    // Old releases reject newer EVM targets
    settings.evm_version = None;

    SolcInput {
        language: SolcLanguage::Solidity,
        sources,
        settings,
    }
}

/// Parse a pinned `major.minor.patch` version
pub fn parse_version(version: &str) -> Result<Version, CompilerError> {
    Version::parse(version.trim_start_matches('v'))
        .map_err(|_| CompilerError::InvalidVersion(version.to_string()))
}

fn release(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

fn check_version(path: &Path, found: &Version, expected: &Version) -> Result<(), CompilerError> {
    let found = release(found);
    if found == release(expected) {
        return Ok(());
    }
    Err(CompilerError::VersionMismatch {
        path: path.to_path_buf(),
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

/// Fail on error-severity diagnostics; return the remaining messages
pub fn check_diagnostics(output: &Value) -> Result<Vec<String>, CompilerError> {
    let compiled: CompilerOutput = serde_json::from_value(output.clone())?;
    let text = |e: &foundry_compilers::artifacts::Error| {
        e.formatted_message
            .clone()
            .unwrap_or_else(|| e.message.clone())
    };

    if compiled.has_error() {
        let errors = compiled
            .errors
            .iter()
            .filter(|e| e.severity.is_error())
            .map(|e| text(e).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(CompilerError::Solc(errors));
    }

    Ok(compiled.errors.iter().map(text).collect())
}
