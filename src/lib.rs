//! Contract Deployer: compile, deploy and drive a Solidity contract on an
//! EVM node
//!
//! This crate provides:
//! - Solidity compilation with a pinned `solc`, installed on first use
//! - secp256k1 keys with Ethereum addresses and EIP-155 transaction signing
//! - A JSON-RPC chain client: nonce, gas price, build, broadcast, receipts
//! - Deployment and interaction sequencing with stage-tagged errors
//! - JSON persistence of compiler output and a deployment ledger
//!
//! # Example
//!
//! ```rust,no_run
//! use contract_deployer::chain::ChainClient;
//! use contract_deployer::contract::{load_source, SolcCompiler};
//! use contract_deployer::deploy::{Session, SessionPlan};
//! use contract_deployer::DeployConfig;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeployConfig::default();
//! // Resolving may download the compiler, so do it outside the runtime
//! let source = load_source(Path::new("SimpleStorage.sol"))?;
//! let compiler = SolcCompiler::resolve("0.6.0", None)?;
//! let artifact = compiler.compile(&source, "SimpleStorage")?.artifact;
//!
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let client = ChainClient::connect(&config.rpc_url)?;
//! let private_key = std::env::var("PRIVATE_KEY")?;
//! let report = Session::new(&client, SessionPlan::from_config(&config))
//!     .run(&artifact, &private_key)
//!     .await?;
//! println!("Deployed at {}", report.deployment.address);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! # })
//! # }
//! ```

pub mod chain;
pub mod cli;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod deploy;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use chain::{AlloyRpc, ChainClient, ChainError, ChainRpc};
pub use config::DeployConfig;
pub use contract::{CompiledArtifact, SolcCompiler};
pub use crypto::KeyPair;
pub use deploy::{DeploymentSequencer, DeploymentState, InteractionSequencer, Session};
pub use error::{DeployError, Stage};
pub use storage::{DeploymentLedger, DeploymentRecord};
