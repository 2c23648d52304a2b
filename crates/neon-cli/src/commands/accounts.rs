// crates/neon-cli/src/commands/accounts.rs
//
// `neon accounts`: the named development accounts usable wherever an
// address is expected.

use tabled::Tabled;

use super::{named_accounts, Context};
use crate::output::{format_json, format_table, OutputFormat};

#[derive(Tabled, serde::Serialize)]
struct AccountRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Address")]
    address: String,
}

/// Run the accounts command. Works offline.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<AccountRow> = named_accounts()
        .into_iter()
        .map(|(name, address)| AccountRow {
            name,
            address: address.to_string(),
        })
        .collect();
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&rows)),
        OutputFormat::Table => println!("{}", format_table(&rows)),
    }
    Ok(())
}
