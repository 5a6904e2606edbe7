//! Roles executor entrypoint.
//!
//! Reads an operation plan, batches it into one transaction, and either prints the result
//! (`plan`), simulates it through the chain's Roles Modifier (`check`), or runs the whole
//! simulate, sign, submit and confirm pipeline (`send`). Results are printed to stdout as JSON;
//! logs go to stderr.
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `config.json`)
//! - `EVM_PRIVATE_KEY` - Signer key, when the config file has no `signer` section
//! - `RUST_LOG` - Log filter (default: `info`, with the `telemetry` feature)

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use roles_chain_eip155::chain::BlockId;
use roles_chain_eip155::multisend::multi_or_one;
use roles_chain_eip155::operations;
use roles_types::chain::{ChainId, ChainRegistry, FromConfig};
use serde_json::json;
use std::path::PathBuf;

use crate::chain::ChainProvider;
use crate::config::Config;
use crate::plan::Plan;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the single transaction a plan batches into, without touching the network.
    Plan { plan: PathBuf },
    /// Simulate a plan through the Roles Modifier and report whether the role permits it.
    Check {
        plan: PathBuf,
        /// Role member to simulate as; defaults to the configured account, then the signer.
        #[arg(long)]
        account: Option<Address>,
        /// Block to simulate against: a number, a block hash, or a tag such as `latest`.
        #[arg(long, default_value = "latest")]
        block: BlockId,
    },
    /// Simulate, sign, submit and wait for the plan's transaction.
    Send { plan: PathBuf },
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("chain {0} is not configured")]
    UnknownChain(ChainId),
    #[error("no account to simulate as: pass --account, or configure an account or a signer")]
    MissingAccount,
    #[error("no signer configured: set signer.privateKey or EVM_PRIVATE_KEY")]
    MissingSigner,
}

#[cfg(feature = "telemetry")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &Config) -> Result<ChainRegistry<ChainProvider>, Box<dyn std::error::Error>> {
    ChainRegistry::from_config(config.chains()).await
}

fn chain_provider<'a>(
    registry: &'a ChainRegistry<ChainProvider>,
    chain: &ChainId,
) -> Result<&'a ChainProvider, RunError> {
    registry
        .by_chain_id(chain)
        .ok_or_else(|| RunError::UnknownChain(chain.clone()))
}

/// Runs one executor command.
///
/// - Loads `.env` variables.
/// - Initializes logging.
/// - Loads the plan and, for `check` and `send`, the configuration.
/// - Connects to the configured chains and dispatches the command.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    #[cfg(feature = "telemetry")]
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan { plan } => {
            let plan = Plan::load(&plan)?;
            let txs = plan.resolve()?;
            let tx = multi_or_one(&txs, &plan.chain)?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
        Command::Check {
            plan,
            account,
            block,
        } => {
            let plan = Plan::load(&plan)?;
            let txs = plan.resolve()?;
            let config = Config::load(&cli.config)?;
            let registry = connect(&config).await?;
            let provider = chain_provider(&registry, &plan.chain)?;
            let account = match account.or(provider.account()) {
                Some(account) => account,
                None => config
                    .signer()?
                    .map(|signer| signer.address())
                    .ok_or(RunError::MissingAccount)?,
            };
            let permitted = operations::check(
                &txs,
                provider.role(),
                account,
                provider.roles_mod(),
                &plan.chain,
                provider.client(),
                block,
            )
            .await?;
            #[cfg(feature = "telemetry")]
            tracing::info!(chain = %plan.chain, account = %account, block = %block, permitted, "Simulation finished");
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "account": account,
                    "block": block.to_string(),
                    "permitted": permitted
                }))?
            );
        }
        Command::Send { plan } => {
            let plan = Plan::load(&plan)?;
            let txs = plan.resolve()?;
            let config = Config::load(&cli.config)?;
            let signer = config.signer()?.ok_or(RunError::MissingSigner)?;
            let registry = connect(&config).await?;
            let provider = chain_provider(&registry, &plan.chain)?;
            let state = operations::send(
                &txs,
                provider.role(),
                signer,
                provider.roles_mod(),
                &plan.chain,
                provider.client(),
                config.polling(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_block(args: &[&str]) -> BlockId {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Check { block, .. } => block,
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn check_defaults_to_the_latest_block() {
        assert_eq!(
            check_block(&["roles-executor", "check", "plan.json"]),
            BlockId::latest()
        );
    }

    #[test]
    fn check_accepts_a_pinned_block() {
        assert_eq!(
            check_block(&["roles-executor", "check", "plan.json", "--block", "19000000"]),
            BlockId::number(19_000_000)
        );
        assert!(
            Cli::try_parse_from(["roles-executor", "check", "plan.json", "--block", "soon"]).is_err()
        );
    }
}
