// crates/neon-cli/src/commands/vault.rs
//
// `neon vault {info, stake, withdraw, pending, claim, exit, position, epoch,
// epochs}`: staking and reward commands.

use clap::Subcommand;
use serde_json::{json, Value};
use tabled::Tabled;

use neon_core::Neon;

use super::{parse_amount, resolve_address, wei_param, Context};
use crate::output::{format_table, print_value, OutputFormat};
use crate::rpc_client::rpc_result;

/// Vault subcommands.
#[derive(Debug, Subcommand)]
pub enum VaultCmd {
    /// Show vault configuration and totals.
    Info,
    /// Stake LP from --from (approve the vault first with `neon lp approve vault`).
    Stake { amount: String },
    /// Withdraw staked LP to --from.
    Withdraw { amount: String },
    /// Preview the reward a claim would pay now.
    Pending { staker: String },
    /// Claim --from's rewards from every closed epoch.
    Claim,
    /// Claim, then withdraw the whole position.
    Exit,
    /// Show a staker's position and pending reward.
    Position { staker: String },
    /// Show one epoch (the open one by default).
    Epoch {
        #[arg(long, conflicts_with = "timestamp")]
        index: Option<u64>,
        /// Unix time inside the epoch.
        #[arg(long)]
        timestamp: Option<u64>,
    },
    /// List recent epochs, newest first.
    Epochs {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

/// A row of the epoch listing.
#[derive(Tabled)]
struct EpochRow {
    #[tabled(rename = "Epoch")]
    index: u64,
    #[tabled(rename = "Start")]
    start: u64,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Staked")]
    staked: String,
    #[tabled(rename = "Eligible")]
    eligible: String,
    #[tabled(rename = "Claimed")]
    claimed: String,
    #[tabled(rename = "Dev fee")]
    dev_fee: String,
}

fn neon_field(epoch: &Value, key: &str) -> String {
    epoch[key]
        .as_str()
        .and_then(|s| s.parse::<u128>().ok())
        .map(|wei| Neon::from_wei(wei).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn epoch_row(epoch: &Value) -> EpochRow {
    let dev_fee = match (epoch["dev_fee_bps"].as_u64(), epoch["dev_fee_paid"].as_bool()) {
        (Some(bps), Some(true)) => format!("{} bps (paid)", bps),
        (Some(bps), _) => format!("{} bps", bps),
        (None, _) => "open".to_string(),
    };
    EpochRow {
        index: epoch["index"].as_u64().unwrap_or_default(),
        start: epoch["start_time"].as_u64().unwrap_or_default(),
        end: epoch["end_time"]
            .as_u64()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string()),
        income: neon_field(epoch, "income"),
        staked: neon_field(epoch, "total_staked"),
        eligible: neon_field(epoch, "eligible_staked"),
        claimed: neon_field(epoch, "claimed"),
        dev_fee,
    }
}

pub async fn run(ctx: &Context, cmd: &VaultCmd) -> Result<(), Box<dyn std::error::Error>> {
    let (method, params) = match cmd {
        VaultCmd::Info => ("vault/info", json!({})),
        VaultCmd::Stake { amount } => (
            "vault/stake",
            json!({ "caller": ctx.caller()?, "amount": wei_param(parse_amount(amount)?) }),
        ),
        VaultCmd::Withdraw { amount } => (
            "vault/withdraw",
            json!({ "caller": ctx.caller()?, "amount": wei_param(parse_amount(amount)?) }),
        ),
        VaultCmd::Pending { staker } => (
            "vault/pending",
            json!({ "staker": resolve_address(staker)? }),
        ),
        VaultCmd::Claim => ("vault/claim", json!({ "caller": ctx.caller()? })),
        VaultCmd::Exit => ("vault/exit", json!({ "caller": ctx.caller()? })),
        VaultCmd::Position { staker } => (
            "vault/position",
            json!({ "staker": resolve_address(staker)? }),
        ),
        VaultCmd::Epoch { index, timestamp } => (
            "vault/epoch",
            json!({ "index": index, "timestamp": timestamp }),
        ),
        VaultCmd::Epochs { limit } => ("vault/epochs", json!({ "limit": limit })),
    };

    let result = rpc_result(&ctx.rpc, method, params).await?;

    match (cmd, ctx.format) {
        (VaultCmd::Epochs { .. }, OutputFormat::Table) => {
            let rows: Vec<EpochRow> = result["epochs"]
                .as_array()
                .map(|epochs| epochs.iter().map(epoch_row).collect())
                .unwrap_or_default();
            println!("{}", format_table(&rows));
            println!("Closed epochs: {}", result["closed_count"]);
        }
        _ => print_value(ctx.format, &result),
    }
    Ok(())
}
