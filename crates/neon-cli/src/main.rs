// crates/neon-cli/src/main.rs
//
// CLI entrypoint for the NEON developer tools.
//
// Provides subcommands for the token, the staking asset, the vault,
// governance and node status, all over JSON-RPC to a running neon-daemon.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::gov::GovCmd;
use commands::lp::LpCmd;
use commands::token::TokenCmd;
use commands::vault::VaultCmd;
use commands::Context;
use output::OutputFormat;

/// NEON CLI: developer tools for the NEON token economy.
#[derive(Parser, Debug)]
#[command(name = "neon", version, about = "NEON token economy CLI")]
struct Cli {
    /// RPC endpoint for the neon-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50051")]
    rpc: String,

    /// Acting account (hex address or development name such as "market").
    #[arg(long = "from", global = true)]
    from: Option<String>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// NEON token: info, balances, transfers, allowances.
    #[command(subcommand)]
    Token(TokenCmd),

    /// LP staking asset: balances and approvals.
    #[command(subcommand)]
    Lp(LpCmd),

    /// Staking vault: stake, withdraw, claim, epochs.
    #[command(subcommand)]
    Vault(VaultCmd),

    /// Governance setters for the token and the vault.
    #[command(subcommand)]
    Gov(GovCmd),

    /// Display daemon version, clock, epoch and health.
    Status,

    /// List the named development accounts.
    Accounts,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ctx = Context {
        rpc: cli.rpc.clone(),
        format: OutputFormat::from_flag(cli.json),
        caller: cli.from.clone(),
    };

    match &cli.command {
        Commands::Token(cmd) => commands::token::run(&ctx, cmd).await?,
        Commands::Lp(cmd) => commands::lp::run(&ctx, cmd).await?,
        Commands::Vault(cmd) => commands::vault::run(&ctx, cmd).await?,
        Commands::Gov(cmd) => commands::gov::run(&ctx, cmd).await?,
        Commands::Status => commands::status::run(&ctx).await?,
        Commands::Accounts => commands::accounts::run(&ctx).await?,
    }

    Ok(())
}
