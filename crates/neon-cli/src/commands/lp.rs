// crates/neon-cli/src/commands/lp.rs
//
// `neon lp {balance, approve}`: the staking asset.

use clap::Subcommand;
use serde_json::json;

use super::{parse_amount, resolve_address, wei_param, Context};
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// LP token subcommands.
#[derive(Debug, Subcommand)]
pub enum LpCmd {
    /// Show an account's LP balance.
    Balance { account: String },
    /// Approve a spender (normally `vault`) to pull --from's LP.
    Approve { spender: String, amount: String },
}

pub async fn run(ctx: &Context, cmd: &LpCmd) -> Result<(), Box<dyn std::error::Error>> {
    let (method, params) = match cmd {
        LpCmd::Balance { account } => (
            "lp/balance",
            json!({ "account": resolve_address(account)? }),
        ),
        LpCmd::Approve { spender, amount } => (
            "lp/approve",
            json!({
                "caller": ctx.caller()?,
                "spender": resolve_address(spender)?,
                "amount": wei_param(parse_amount(amount)?),
            }),
        ),
    };
    let result = rpc_result(&ctx.rpc, method, params).await?;
    print_value(ctx.format, &result);
    Ok(())
}
