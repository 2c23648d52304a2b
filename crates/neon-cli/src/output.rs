// crates/neon-cli/src/output.rs
//
// Output formatting utilities for the NEON CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

use neon_core::Neon;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Key/value table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// One field of a flattened result object.
#[derive(Debug, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Whether a field name holds a wei amount.
fn is_amount_field(name: &str) -> bool {
    const AMOUNT_FIELDS: [&str; 19] = [
        "amount",
        "balance",
        "allowance",
        "delivered",
        "fee",
        "total_supply",
        "income",
        "total_staked",
        "eligible_staked",
        "claimed",
        "reward",
        "dev_fee_paid",
        "pending",
        "pending_reward",
        "withdrawn",
        "staked",
        "routed",
        "unrouted",
        "collected",
    ];
    let leaf = name.rsplit('.').next().unwrap_or(name);
    AMOUNT_FIELDS.contains(&leaf)
}

/// Flatten a JSON object into dotted `field = value` rows. Arrays are shown
/// inline as JSON; wei strings gain a NEON rendering.
pub fn flatten(value: &Value) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<FieldRow>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&name, inner, rows);
            }
        }
        Value::String(s) if is_amount_field(prefix) => {
            let value = match s.parse::<u128>() {
                Ok(wei) => format!("{} ({} wei)", Neon::from_wei(wei), wei),
                Err(_) => s.clone(),
            };
            rows.push(FieldRow {
                field: prefix.to_string(),
                value,
            });
        }
        Value::String(s) => rows.push(FieldRow {
            field: prefix.to_string(),
            value: s.clone(),
        }),
        Value::Null => rows.push(FieldRow {
            field: prefix.to_string(),
            value: "-".to_string(),
        }),
        other => rows.push(FieldRow {
            field: prefix.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Print an RPC result in the chosen format.
pub fn print_value(format: OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => println!("{}", format_table(&flatten(value))),
    }
}
