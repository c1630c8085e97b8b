//! Contract deployer CLI
//!
//! Compiles a Solidity contract, deploys it to an EVM node over JSON-RPC and
//! drives its getter and setter.

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use contract_deployer::cli;
use contract_deployer::config::{DeployConfig, DEFAULT_RPC_URL};
use contract_deployer::contract::{abi::parse_args, DEFAULT_SOLC_VERSION};
use contract_deployer::error::DeployError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "deployer")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Compile, deploy and interact with a storage contract", long_about = None)]
struct Cli {
    /// JSON-RPC endpoint of the node
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Expected chain id (checked against the node)
    #[arg(long, env = "CHAIN_ID")]
    chain_id: Option<u64>,

    /// Expected sender address (checked against PRIVATE_KEY)
    #[arg(long, env = "SENDER_ADDRESS")]
    sender: Option<Address>,

    /// Contract source file
    #[arg(short, long, default_value = "SimpleStorage.sol")]
    source: PathBuf,

    /// Contract name inside the source (defaults to the file stem)
    #[arg(long)]
    contract: Option<String>,

    /// Required solc version
    #[arg(long, env = "SOLC_VERSION", default_value = DEFAULT_SOLC_VERSION)]
    solc_version: String,

    /// Explicit path to the solc binary
    #[arg(long, env = "SOLC_PATH")]
    solc_path: Option<PathBuf>,

    /// Where to write the full compiler output
    #[arg(short, long, default_value = "compiled_code.json")]
    output: PathBuf,

    /// Directory for the deployment ledger
    #[arg(short, long, default_value = ".deployer_data")]
    data_dir: PathBuf,

    /// Give up waiting for a receipt after this many seconds
    #[arg(long)]
    receipt_timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile, deploy, then read, store and read again (default)
    Run {
        /// Value passed to the setter
        #[arg(long, default_value = "15")]
        value: String,
    },

    /// Compile and write the compiler output
    Compile,

    /// Compile and deploy
    Deploy {
        /// Constructor arguments (comma-separated)
        #[arg(long)]
        args: Option<String>,
    },

    /// Call a read-only method
    Call {
        /// Contract address
        #[arg(short, long)]
        address: Address,

        /// Method name or full signature
        #[arg(short, long)]
        method: String,

        /// Arguments (comma-separated)
        #[arg(long)]
        args: Option<String>,
    },

    /// Send a state-changing transaction
    Send {
        /// Contract address
        #[arg(short, long)]
        address: Address,

        /// Method name or full signature
        #[arg(short, long)]
        method: String,

        /// Arguments (comma-separated)
        #[arg(long)]
        args: Option<String>,
    },

    /// List recorded deployments
    Deployments {
        /// Only the latest deployment of the contract on --chain-id
        #[arg(long)]
        latest: bool,
    },

    /// Generate a new signing key
    Keygen,
}

impl Cli {
    fn config(&self) -> DeployConfig {
        DeployConfig {
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id,
            sender: self.sender,
            source_path: self.source.clone(),
            contract_name: self.contract.clone(),
            solc_version: self.solc_version.clone(),
            solc_path: self.solc_path.clone(),
            output_path: self.output.clone(),
            data_dir: self.data_dir.clone(),
            receipt_timeout: self.receipt_timeout.map(Duration::from_secs),
            ..Default::default()
        }
    }
}

fn main() {
    // Load .env before clap reads its env fallbacks
    let dotenv = dotenvy::dotenv();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {:?}", path);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<DeployError>() {
            Some(err) => {
                eprintln!("❌ Failed at stage '{}': {}", err.stage(), err);
                if err.is_retryable() {
                    eprintln!("   ℹ️  This failure may succeed if retried");
                }
            }
            None => eprintln!("❌ {}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> cli::CliResult<()> {
    let mut config = cli.config();

    match cli.command.unwrap_or(Commands::Run {
        value: config.store_value.clone(),
    }) {
        Commands::Compile => cli::cmd_compile(&config),
        Commands::Deployments { latest } => cli::cmd_deployments(&config, latest),
        Commands::Keygen => cli::cmd_keygen(),

        Commands::Run { value } => {
            config.store_value = value;
            let private_key = private_key();
            block_on(cli::cmd_run(&config, &private_key))
        }

        Commands::Deploy { args } => {
            let private_key = private_key();
            block_on(cli::cmd_deploy(
                &config,
                parse_args(args.as_deref()),
                &private_key,
            ))
        }

        Commands::Call {
            address,
            method,
            args,
        } => block_on(cli::cmd_call(
            &config,
            address,
            &method,
            &parse_args(args.as_deref()),
        )),

        Commands::Send {
            address,
            method,
            args,
        } => {
            let private_key = private_key();
            block_on(cli::cmd_send(
                &config,
                address,
                &method,
                &parse_args(args.as_deref()),
                &private_key,
            ))
        }
    }
}

/// Signing key from the environment. A missing variable is passed on as
/// empty so it fails at the signing stage like any other bad key.
fn private_key() -> String {
    std::env::var("PRIVATE_KEY").unwrap_or_default()
}

fn block_on<F>(future: F) -> cli::CliResult<()>
where
    F: std::future::Future<Output = cli::CliResult<()>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}
