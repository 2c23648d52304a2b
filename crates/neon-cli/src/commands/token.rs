// crates/neon-cli/src/commands/token.rs
//
// `neon token {info, balance, transfer, approve, transfer-from, allowance}`.

use clap::Subcommand;
use serde_json::json;

use super::{parse_amount, resolve_address, wei_param, Context};
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// NEON token subcommands.
#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    /// Show name, supply, fee rate and wiring.
    Info,
    /// Show an account's NEON balance.
    Balance {
        /// Hex address or development account name.
        account: String,
    },
    /// Send NEON from --from; the transfer fee goes to the vault.
    Transfer {
        to: String,
        /// Amount in NEON ("1.5") or wei ("1500wei").
        amount: String,
    },
    /// Let a spender move up to `amount` of --from's NEON.
    Approve { spender: String, amount: String },
    /// Move NEON out of `owner` using --from's allowance.
    TransferFrom {
        owner: String,
        to: String,
        amount: String,
    },
    /// Show how much `spender` may move on behalf of `owner`.
    Allowance { owner: String, spender: String },
}

/// Run the token subcommand.
pub async fn run(ctx: &Context, cmd: &TokenCmd) -> Result<(), Box<dyn std::error::Error>> {
    let (method, params) = match cmd {
        TokenCmd::Info => ("token/info", json!({})),
        TokenCmd::Balance { account } => (
            "token/balance",
            json!({ "account": resolve_address(account)? }),
        ),
        TokenCmd::Transfer { to, amount } => (
            "token/transfer",
            json!({
                "caller": ctx.caller()?,
                "to": resolve_address(to)?,
                "amount": wei_param(parse_amount(amount)?),
            }),
        ),
        TokenCmd::Approve { spender, amount } => (
            "token/approve",
            json!({
                "caller": ctx.caller()?,
                "spender": resolve_address(spender)?,
                "amount": wei_param(parse_amount(amount)?),
            }),
        ),
        TokenCmd::TransferFrom { owner, to, amount } => (
            "token/transfer_from",
            json!({
                "caller": ctx.caller()?,
                "from": resolve_address(owner)?,
                "to": resolve_address(to)?,
                "amount": wei_param(parse_amount(amount)?),
            }),
        ),
        TokenCmd::Allowance { owner, spender } => (
            "token/allowance",
            json!({
                "owner": resolve_address(owner)?,
                "spender": resolve_address(spender)?,
            }),
        ),
    };

    let result = rpc_result(&ctx.rpc, method, params).await?;
    print_value(ctx.format, &result);
    Ok(())
}
