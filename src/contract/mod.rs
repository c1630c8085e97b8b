//! Smart contract module
//!
//! Loads Solidity source, compiles it with a pinned `solc` (installed on
//! first use), and encodes calls against the resulting ABI.
//!
//! # Example
//!
//! ```rust,no_run
//! use contract_deployer::contract::{load_source, SolcCompiler};
//! use std::path::Path;
//!
//! let source = load_source(Path::new("SimpleStorage.sol")).unwrap();
//! let compiler = SolcCompiler::resolve("0.6.0", None).unwrap();
//! let compilation = compiler.compile(&source, "SimpleStorage").unwrap();
//! println!("{:?}", compilation.artifact.function_signatures());
//! ```

pub mod abi;
pub mod artifact;
pub mod compiler;
pub mod source;

pub use abi::{encode_call, encode_constructor, format_value, format_values, AbiError, EncodedCall};
pub use artifact::CompiledArtifact;
pub use compiler::{
    standard_input, Compilation, CompilerError, SolcCompiler, DEFAULT_SOLC_VERSION,
    OUTPUT_SELECTION,
};
pub use source::{load_source, ContractSource, SourceError};
