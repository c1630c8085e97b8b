//! CLI commands for the deployer
//!
//! Implements all command handlers for the CLI interface.

use crate::chain::ChainClient;
use crate::config::DeployConfig;
use crate::contract::{
    format_values, load_source, CompiledArtifact, CompilerError, SolcCompiler,
};
use crate::crypto::KeyPair;
use crate::deploy::{ContractHandle, Deployment, Session, SessionPlan};
use crate::error::{DeployError, Stage, StageExt};
use crate::storage::{read_json, write_json, DeploymentLedger, DeploymentRecord};
use alloy_primitives::Address;
use chrono::Utc;
use serde_json::Value;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Compile the configured source and write the full compiler output
pub fn compile_contract(config: &DeployConfig) -> Result<CompiledArtifact, DeployError> {
    let source = load_source(&config.source_path)?;
    let compiler = SolcCompiler::resolve(&config.solc_version, config.solc_path.as_deref())?;
    let compilation = compiler.compile(&source, &config.contract_name())?;

    write_json(&config.output_path, &compilation.output)
        .map_err(|e| DeployError::storage(Stage::WriteOutput, e))?;

    Ok(compilation.artifact)
}

/// [`compile_contract`] on a blocking thread.
///
/// Resolving the compiler may download it, which must not happen on the
/// async runtime.
pub async fn compile_contract_blocking(
    config: &DeployConfig,
) -> Result<CompiledArtifact, DeployError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || compile_contract(&config))
        .await
        .map_err(|e| CompilerError::Solc(format!("compiler task failed: {}", e)))?
}

/// Load a previously written compiler output
pub fn load_artifact(config: &DeployConfig) -> Result<CompiledArtifact, DeployError> {
    let output: Value = read_json(&config.output_path)
        .map_err(|e| DeployError::storage(Stage::LoadOutput, e))?;
    let file_name = config
        .source_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    Ok(CompiledArtifact::from_standard_output(
        &output,
        file_name,
        &config.contract_name(),
    )?)
}

/// Chain client for the configured endpoint
pub fn connect(config: &DeployConfig) -> Result<ChainClient, DeployError> {
    Ok(ChainClient::connect(&config.rpc_url)
        .at(Stage::Configure)?
        .with_poll_interval(config.poll_interval)
        .with_receipt_timeout(config.receipt_timeout))
}

fn record_deployment(config: &DeployConfig, contract_name: &str, deployment: &Deployment) {
    let record = DeploymentRecord {
        contract_name: contract_name.to_string(),
        address: deployment.address,
        transaction_hash: deployment.transaction_hash(),
        chain_id: deployment.chain_id,
        deployer: deployment.deployer,
        block_number: deployment.receipt.block_number,
        deployed_at: Utc::now(),
    };

    // The contract is live either way; a ledger failure only loses history.
    if let Err(e) = DeploymentLedger::new(&config.storage()).and_then(|l| l.record(record)) {
        log::warn!("{}", DeployError::storage(Stage::Record, e));
    }
}

fn print_deployment(deployment: &Deployment) {
    println!("✅ Contract deployed!");
    println!("   📍 Address: {}", deployment.address);
    println!("   🔗 Transaction: {}", deployment.transaction_hash());
    println!("   🔢 Nonce: {}", deployment.nonce);
    if let Some(block) = deployment.receipt.block_number {
        println!("   🧱 Block: {}", block);
    }
}

/// Compile only
pub fn cmd_compile(config: &DeployConfig) -> CliResult<()> {
    println!("🔨 Compiling {:?}...", config.source_path);
    let artifact = compile_contract(config)?;

    println!("✅ Compiled {}", artifact.contract_name);
    println!("   📄 Output: {:?}", config.output_path);
    println!("   📦 Bytecode: {} bytes", artifact.bytecode.len());
    for signature in artifact.function_signatures() {
        println!("   ├─ {}", signature);
    }

    Ok(())
}

/// Compile, deploy, read the getter, call the setter, read the getter again
pub async fn cmd_run(config: &DeployConfig, private_key: &str) -> CliResult<()> {
    println!("🔨 Compiling {:?}...", config.source_path);
    let artifact = compile_contract_blocking(config).await?;

    let client = connect(config)?;
    let session = Session::new(&client, SessionPlan::from_config(config));

    println!("🚀 Deploying {}...", artifact.contract_name);
    let report = session.run(&artifact, private_key).await?;
    print_deployment(&report.deployment);
    record_deployment(config, &artifact.contract_name, &report.deployment);

    println!("{}", format_values(&report.interaction.before));
    println!(
        "📝 {}({}) confirmed in {}",
        config.setter, config.store_value, report.interaction.receipt.transaction_hash
    );
    println!("{}", format_values(&report.interaction.after));

    Ok(())
}

/// Compile and deploy
pub async fn cmd_deploy(
    config: &DeployConfig,
    constructor_args: Vec<String>,
    private_key: &str,
) -> CliResult<()> {
    let artifact = compile_contract_blocking(config).await?;
    let client = connect(config)?;
    let plan = SessionPlan {
        constructor_args,
        ..SessionPlan::from_config(config)
    };

    println!("🚀 Deploying {}...", artifact.contract_name);
    let deployment = Session::new(&client, plan)
        .deploy(&artifact, private_key)
        .await?;
    print_deployment(&deployment);
    record_deployment(config, &artifact.contract_name, &deployment);

    Ok(())
}

/// Read-only call against a deployed contract
pub async fn cmd_call(
    config: &DeployConfig,
    address: Address,
    method: &str,
    args: &[String],
) -> CliResult<()> {
    let artifact = load_artifact(config)?;
    let client = connect(config)?;

    let values = client
        .call(address, &artifact.abi, method, args)
        .await
        .at(Stage::Call)?;
    println!("{}", format_values(&values));

    Ok(())
}

/// Send a state-changing transaction to a deployed contract
pub async fn cmd_send(
    config: &DeployConfig,
    address: Address,
    method: &str,
    args: &[String],
    private_key: &str,
) -> CliResult<()> {
    let artifact = load_artifact(config)?;
    let client = connect(config)?;
    let contract = ContractHandle::new(address, artifact.abi);

    let receipt = Session::new(&client, SessionPlan::from_config(config))
        .send(&contract, method, args, private_key)
        .await?;

    println!("✅ {} confirmed", method);
    println!("   🔗 Transaction: {}", receipt.transaction_hash);
    if let Some(block) = receipt.block_number {
        println!("   🧱 Block: {}", block);
    }

    Ok(())
}

/// Most recent recorded deployment of the configured contract on the
/// configured chain
pub fn latest_deployment(config: &DeployConfig) -> Result<Option<DeploymentRecord>, DeployError> {
    let chain_id = config
        .chain_id
        .ok_or_else(|| DeployError::config("--latest needs a chain id (--chain-id or CHAIN_ID)"))?;
    DeploymentLedger::new(&config.storage())
        .and_then(|ledger| ledger.latest(&config.contract_name(), chain_id))
        .map_err(|e| DeployError::storage(Stage::LoadLedger, e))
}

/// List recorded deployments, or only the latest one
pub fn cmd_deployments(config: &DeployConfig, latest: bool) -> CliResult<()> {
    if latest {
        match latest_deployment(config)? {
            Some(record) => println!(
                "📌 {} on chain {}: {} (tx {})",
                record.contract_name, record.chain_id, record.address, record.transaction_hash
            ),
            None => println!("📭 No {} deployment recorded", config.contract_name()),
        }
        return Ok(());
    }

    let ledger = DeploymentLedger::new(&config.storage())?;
    let records = ledger.list()?;

    if records.is_empty() {
        println!("📭 No deployments recorded in {:?}", ledger.path());
        return Ok(());
    }

    println!("📜 Deployments ({}):", records.len());
    for record in records {
        println!(
            "   {} {} on chain {} at {}",
            record.deployed_at.format("%Y-%m-%d %H:%M:%S"),
            record.contract_name,
            record.chain_id,
            record.address
        );
    }

    Ok(())
}

/// Generate a fresh signing key
pub fn cmd_keygen() -> CliResult<()> {
    let key = KeyPair::generate();

    println!("🔑 New key generated");
    println!("   📍 Address: {}", key.address());
    println!("   🔐 Private key: {}", key.private_key_hex());
    println!("   ⚠️  Store it as PRIVATE_KEY in .env; never commit it");

    Ok(())
}
