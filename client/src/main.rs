use std::path::PathBuf;

use anyhow::Result;
use asset_contract::Function;
use clap::{Parser, Subcommand};
use client::config::load_config;
use client::gateway::Gateway;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "asset-cli")]
#[command(about = "Invokes the asset chaincode on a local sandbox ledger")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,
    /// Ledger snapshot to use instead of the configured one
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the ledger with the sample assets
    InitLedger,
    /// Issue a new asset
    CreateAsset {
        #[arg(long)]
        id: String,
        #[arg(long = "type")]
        asset_type: String,
        #[arg(long, allow_negative_numbers = true)]
        price: i64,
        #[arg(long)]
        owner: String,
    },
    /// Read an asset by ID
    ReadAsset {
        #[arg(long)]
        id: String,
    },
    /// Search for an asset by ID
    SearchAsset {
        #[arg(long)]
        id: String,
    },
    /// Change the price of an asset
    UpdatePrice {
        #[arg(long)]
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        new_price: i64,
    },
    /// Transfer an asset to a new owner
    Transfer {
        #[arg(long)]
        id: String,
        #[arg(long)]
        new_owner: String,
    },
    /// List every asset in the world state
    GetAllAssets,
    /// Show the change history of an asset
    History {
        #[arg(long)]
        id: String,
    },
    /// Check whether an asset exists
    Exists {
        #[arg(long)]
        id: String,
    },
    /// Invoke any contract function by name with positional arguments
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the contract functions
    Functions,
    /// Show the ledger height
    LedgerEnd,
}

impl Commands {
    /// Function name and positional arguments for commands that map onto a
    /// single contract call.
    fn to_call(&self) -> Option<(String, Vec<String>)> {
        let (function, args) = match self {
            Commands::InitLedger => (Function::InitLedger, vec![]),
            Commands::CreateAsset {
                id,
                asset_type,
                price,
                owner,
            } => (
                Function::CreateAsset,
                vec![id.clone(), asset_type.clone(), price.to_string(), owner.clone()],
            ),
            Commands::ReadAsset { id } => (Function::ReadAsset, vec![id.clone()]),
            Commands::SearchAsset { id } => (Function::SearchAssetById, vec![id.clone()]),
            Commands::UpdatePrice { id, new_price } => (
                Function::UpdateAssetPrice,
                vec![id.clone(), new_price.to_string()],
            ),
            Commands::Transfer { id, new_owner } => {
                (Function::TransferAsset, vec![id.clone(), new_owner.clone()])
            }
            Commands::GetAllAssets => (Function::GetAllAssets, vec![]),
            Commands::History { id } => (Function::GetAssetHistory, vec![id.clone()]),
            Commands::Exists { id } => (Function::AssetExists, vec![id.clone()]),
            Commands::Invoke { function, args } => return Some((function.clone(), args.clone())),
            Commands::Functions | Commands::LedgerEnd => return None,
        };
        Some((function.name().to_string(), args))
    }
}

fn print_payload(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config_file.as_deref())?;
    client::init_tracing(&config.logging.level);
    if let Some(state_file) = cli.state_file {
        config.ledger.state_file = state_file;
    }
    debug!("Using config: {:#?}", config);

    match cli.command {
        Commands::Functions => {
            println!(
                "{}",
                serde_json::to_string_pretty(&asset_contract::metadata())?
            );
            Ok(())
        }
        Commands::LedgerEnd => {
            let gateway = Gateway::open(&config.ledger)?;
            info!("Ledger end: {}", gateway.height());
            println!("{}", gateway.height());
            Ok(())
        }
        command => {
            let mut gateway = Gateway::open(&config.ledger)?;
            if let Some((function, args)) = command.to_call() {
                let payload = gateway.invoke(&function, &args)?;
                print_payload(&payload)?;
            }
            Ok(())
        }
    }
}
