//! alt_resolver - inspect lookup tables and resolve v0 transactions
//!
//! Usage:
//!   alt_resolver [--config PATH] table <ADDRESS>
//!   alt_resolver [--config PATH] resolve <BASE64_TX>

use alt_resolver::{
    AppConfig, LookupMessage, RpcAccountFetcher, TableCache, TableFetcher, UiLookupTable,
};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

enum Command {
    Table(Pubkey),
    Resolve(String),
}

fn print_usage() {
    println!("Usage: alt_resolver [--config PATH] <COMMAND>");
    println!("  table <ADDRESS>      Fetch a lookup table and print it as JSON");
    println!("  resolve <BASE64_TX>  Resolve a v0 transaction's lookups and print its accounts");
    println!("  --config PATH        Configuration file (default: config.yaml, config/config.yaml)");
}

fn parse_args() -> (Option<PathBuf>, Command) {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("ERROR: --config requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let command = match positional.as_slice() {
        [cmd, address] if cmd == "table" => match Pubkey::from_str(address) {
            Ok(address) => Command::Table(address),
            Err(e) => {
                eprintln!("ERROR: invalid table address {}: {}", address, e);
                std::process::exit(1);
            }
        },
        [cmd, tx] if cmd == "resolve" => Command::Resolve(tx.clone()),
        _ => {
            print_usage();
            std::process::exit(1);
        }
    };

    (config_path, command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let (config_path, command) = parse_args();
    let config = load_config(config_path)?;
    tracing::debug!(
        rpc_url = %config.rpc.url,
        commitment = %config.rpc.commitment,
        program_id = %config.program.lookup_table_program_id,
        "Configuration loaded"
    );

    let fetcher = RpcAccountFetcher::new(
        &config.rpc.url,
        config.rpc_timeout(),
        config.commitment_config()?,
        config.program_id()?,
    );
    let tables = TableFetcher::new(
        fetcher,
        TableCache::new(config.cache.capacity, config.cache.ttl_seconds),
    );

    match command {
        Command::Table(address) => {
            let table = tables.fetch_table(&address).await?;
            let output = json!({
                "address": address.to_string(),
                "table": UiLookupTable::from(&table),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Resolve(encoded) => {
            let mut message = LookupMessage::from_base64_transaction(&encoded)?;
            tables.resolve_message(&mut message).await?;

            let accounts: Vec<_> = message
                .account_meta_list()?
                .into_iter()
                .map(|meta| {
                    json!({
                        "pubkey": meta.pubkey.to_string(),
                        "isSigner": meta.is_signer,
                        "isWritable": meta.is_writable,
                    })
                })
                .collect();
            let output = json!({
                "staticKeys": message.static_account_keys().len(),
                "writableLookups": message.num_writable_lookups(),
                "readonlyLookups": message.num_lookups() - message.num_writable_lookups(),
                "accounts": accounts,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Initialize tracing with JSON output
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alt_resolver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Load and validate configuration
fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = match path {
        Some(path) => AppConfig::load_from(&path),
        None => AppConfig::load(),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}
