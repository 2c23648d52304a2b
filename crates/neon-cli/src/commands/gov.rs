// crates/neon-cli/src/commands/gov.rs
//
// `neon gov ...`: governance setters for the token and the vault. Every
// command acts as --from, which must be the component's principal.

use clap::{Subcommand, ValueEnum};
use serde_json::{json, Value};

use super::{resolve_address, Context};
use crate::output::print_value;
use crate::rpc_client::rpc_result;

/// Ownership step for `token-owner` / `vault-owner`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Step {
    /// Hand over immediately.
    Transfer,
    /// Nominate; the nominee must accept.
    Nominate,
    /// Accept a nomination as --from.
    Accept,
}

impl Step {
    fn as_str(self) -> &'static str {
        match self {
            Step::Transfer => "transfer",
            Step::Nominate => "nominate",
            Step::Accept => "accept",
        }
    }
}

/// Governance subcommands.
#[derive(Debug, Subcommand)]
pub enum GovCmd {
    /// Set the transfer fee in basis points.
    TransferFee { bps: u16 },
    /// Set the token's reward pool (fee recipient).
    RewardPool { address: String },
    /// Set the fee-exempt presale distributor.
    Presale { address: String },
    /// Pause token transfers and vault operations.
    Pause,
    /// Resume token transfers and vault operations.
    Unpause,
    /// Move token ownership.
    TokenOwner {
        #[arg(value_enum)]
        step: Step,
        /// New owner or nominee (omit for accept).
        address: Option<String>,
    },
    /// Set the epoch length in seconds.
    RewardPeriod { seconds: u64 },
    /// Set the developer cut in basis points.
    DevFee { bps: u16 },
    /// Set the developer cut receiver.
    DevFeeReceiver { address: String },
    /// Set the LP token accepted for staking.
    StakingAsset { address: String },
    /// Set the token paid out as reward.
    RewardAsset { address: String },
    /// Move vault ownership.
    VaultOwner {
        #[arg(value_enum)]
        step: Step,
        address: Option<String>,
    },
    /// Pay every outstanding dev cut to the receiver.
    CollectDevFees,
}

fn ownership(caller: Value, step: Step, address: &Option<String>) -> Result<Value, Box<dyn std::error::Error>> {
    let address = address.as_deref().map(resolve_address).transpose()?;
    Ok(json!({ "caller": caller, "step": step.as_str(), "address": address }))
}

pub async fn run(ctx: &Context, cmd: &GovCmd) -> Result<(), Box<dyn std::error::Error>> {
    let caller = serde_json::to_value(ctx.caller()?)?;
    let (method, params) = match cmd {
        GovCmd::TransferFee { bps } => ("gov/transfer_fee", json!({ "caller": caller, "bps": bps })),
        GovCmd::RewardPool { address } => (
            "gov/reward_pool",
            json!({ "caller": caller, "address": resolve_address(address)? }),
        ),
        GovCmd::Presale { address } => (
            "gov/presale",
            json!({ "caller": caller, "address": resolve_address(address)? }),
        ),
        GovCmd::Pause => ("gov/pause", json!({ "caller": caller })),
        GovCmd::Unpause => ("gov/unpause", json!({ "caller": caller })),
        GovCmd::TokenOwner { step, address } => ("gov/token_owner", ownership(caller, *step, address)?),
        GovCmd::RewardPeriod { seconds } => (
            "gov/reward_period",
            json!({ "caller": caller, "period": seconds }),
        ),
        GovCmd::DevFee { bps } => ("gov/dev_fee", json!({ "caller": caller, "bps": bps })),
        GovCmd::DevFeeReceiver { address } => (
            "gov/dev_fee_receiver",
            json!({ "caller": caller, "address": resolve_address(address)? }),
        ),
        GovCmd::StakingAsset { address } => (
            "gov/staking_asset",
            json!({ "caller": caller, "address": resolve_address(address)? }),
        ),
        GovCmd::RewardAsset { address } => (
            "gov/reward_asset",
            json!({ "caller": caller, "address": resolve_address(address)? }),
        ),
        GovCmd::VaultOwner { step, address } => ("gov/vault_owner", ownership(caller, *step, address)?),
        GovCmd::CollectDevFees => ("gov/collect_dev_fees", json!({ "caller": caller })),
    };

    let result = rpc_result(&ctx.rpc, method, params).await?;
    print_value(ctx.format, &result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_params() {
        let params = ownership(json!("0xab"), Step::Accept, &None).unwrap();
        assert_eq!(params["step"], "accept");
        assert!(params["address"].is_null());

        let params = ownership(json!("0xab"), Step::Nominate, &Some("team".to_string())).unwrap();
        assert_eq!(params["step"], "nominate");
        assert!(params["address"].as_str().unwrap().starts_with("0x"));
    }
}
