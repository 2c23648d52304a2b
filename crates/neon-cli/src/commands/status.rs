// crates/neon-cli/src/commands/status.rs
//
// `neon status`: daemon version, clock, epoch and health.

use serde_json::json;

use super::Context;
use crate::output::{format_json, OutputFormat};
use crate::rpc_client::rpc_result;

/// Run the status command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let info = rpc_result(&ctx.rpc, "node/info", json!({})).await?;
    let health = rpc_result(&ctx.rpc, "node/health", json!({})).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&json!({ "info": info, "health": health })));
        return Ok(());
    }

    println!("NEON node v{}", info["version"].as_str().unwrap_or("?"));
    println!();
    println!("Node Status");
    println!("-----------");
    println!("  RPC endpoint: {}", ctx.rpc);
    println!("  Health:       {}", health["status"].as_str().unwrap_or("unknown"));
    if let Some(details) = health["details"].as_str() {
        println!("  Details:      {}", details);
    }
    println!("  Uptime:       {}s", info["uptime_seconds"]);
    println!("  Clock:        {}", info["now"]);
    println!("  Epoch:        {}", info["current_epoch"]);
    println!("  Fee events:   {}", info["router"]["events"]);
    println!("  Fees routed:  {} wei", info["router"]["routed"].as_str().unwrap_or("0"));

    Ok(())
}
