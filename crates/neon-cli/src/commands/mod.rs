// crates/neon-cli/src/commands/mod.rs
//
// Command module declarations for the NEON CLI, plus argument helpers
// shared by every subcommand.

pub mod accounts;
pub mod gov;
pub mod lp;
pub mod status;
pub mod token;
pub mod vault;

use neon_core::{Address, Neon, Wei};
use neon_economics::EconomyGenesis;

use crate::output::OutputFormat;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    /// RPC endpoint of the daemon.
    pub rpc: String,
    pub format: OutputFormat,
    /// Acting account for mutating calls, before resolution.
    pub caller: Option<String>,
}

impl Context {
    /// The resolved `--from` account, required by mutating commands.
    pub fn caller(&self) -> Result<Address, Box<dyn std::error::Error>> {
        let raw = self
            .caller
            .as_deref()
            .ok_or("this command needs --from <account>")?;
        resolve_address(raw)
    }
}

/// Named development accounts, matching the daemon's default genesis.
pub fn named_accounts() -> Vec<(&'static str, Address)> {
    let g = EconomyGenesis::development();
    vec![
        ("governance", g.governance),
        ("presale", g.allocation.presale),
        ("uniswap-airdrop", g.allocation.uniswap_airdrop),
        ("market", g.allocation.market),
        ("team", g.allocation.team),
        ("token", g.token_address),
        ("lp", g.lp_address),
        ("vault", g.vault_address),
    ]
}

/// Parse a hex address or a development account name ("market", "vault").
pub fn resolve_address(raw: &str) -> Result<Address, Box<dyn std::error::Error>> {
    if let Some((_, address)) = named_accounts()
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
    {
        return Ok(address);
    }
    Ok(raw.parse::<Address>()?)
}

/// Parse a token amount: decimal NEON ("1.5") or raw wei with a `wei` suffix.
pub fn parse_amount(raw: &str) -> Result<Wei, Box<dyn std::error::Error>> {
    let raw = raw.trim();
    if let Some(wei) = raw.strip_suffix("wei") {
        return Ok(wei.trim().parse::<Wei>()?);
    }
    Ok(Neon::parse(raw)?.wei)
}

/// Wei amounts travel as decimal strings.
pub fn wei_param(amount: Wei) -> serde_json::Value {
    serde_json::Value::String(amount.to_string())
}
