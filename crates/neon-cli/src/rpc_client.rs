// crates/neon-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs envelopes to the neon-daemon.

use neon_rpc::{JsonRpcRequest, JsonRpcResponse, SERVICE_NAME};

/// URL of the daemon's single RPC method under `endpoint`.
pub fn call_url(endpoint: &str) -> String {
    format!("{}/{}/Call", endpoint.trim_end_matches('/'), SERVICE_NAME)
}

/// Send a JSON-RPC call to the daemon and return the parsed response.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest::new(method, params);

    let client = reqwest::Client::new();
    let resp = client
        .post(call_url(endpoint))
        .json(&request)
        .send()
        .await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Like `rpc_call`, but turns an error envelope into `Err`.
pub async fn rpc_result(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let response = rpc_call(endpoint, method, params).await?;
    if !response.success {
        let error = response
            .error
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(format!("{} failed: {}", method, error).into());
    }
    Ok(response.result.unwrap_or(serde_json::Value::Null))
}
