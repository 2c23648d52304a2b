// crates/neon-rpc/src/server.rs
//
// RPC server setup: NeonRpcServer and RpcConfig.
//
// A single tonic unary service accepts JSON-encoded requests with a method
// field, dispatches to the appropriate handler against the shared economy,
// and returns JSON-encoded responses.

use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use neon_economics::SharedEconomy;

use crate::handlers;
use crate::middleware;

/// gRPC service name; clients POST envelopes to `/<SERVICE_NAME>/Call`.
pub const SERVICE_NAME: &str = "neon.rpc.NeonService";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "token/transfer", "vault/claim").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

impl JsonRpcResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// NeonRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the NEON economy.
///
/// Holds the shared economy handle and exposes a tonic-based server with
/// JSON-RPC dispatching.
#[derive(Clone)]
pub struct NeonRpcServer {
    config: RpcConfig,
    service: NeonServiceImpl,
}

impl std::fmt::Debug for NeonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeonRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl NeonRpcServer {
    pub fn new(config: RpcConfig, economy: SharedEconomy) -> Self {
        Self {
            config,
            service: NeonServiceImpl {
                economy,
                start_time: Instant::now(),
            },
        }
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, start_time: Instant) -> Self {
        self.service.start_time = start_time;
        self
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Dispatch one request in-process, bypassing the transport.
    pub async fn call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service.dispatch(request).await
    }

    /// Start the RPC server and listen for requests.
    ///
    /// This binds to the configured address and serves requests until
    /// the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("NEON RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                NeonJsonRpcServer::new(self.service.clone()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service Definition (manual, no proto codegen)
// ---------------------------------------------------------------------------

/// Shared state plus method dispatch.
#[derive(Clone)]
struct NeonServiceImpl {
    economy: SharedEconomy,
    start_time: Instant,
}

impl NeonServiceImpl {
    /// Dispatch a JSON-RPC request to the appropriate handler based on the method name.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let economy = &self.economy;
        let params = request.params;
        let result = match request.method.as_str() {
            // Value ledger
            "token/info" => dispatch_handler(params, |r| handlers::token::handle_info(economy, r)).await,
            "token/balance" => dispatch_handler(params, |r| handlers::token::handle_balance(economy, r)).await,
            "token/transfer" => dispatch_handler(params, |r| handlers::token::handle_transfer(economy, r)).await,
            "token/transfer_from" => {
                dispatch_handler(params, |r| handlers::token::handle_transfer_from(economy, r)).await
            }
            "token/approve" => dispatch_handler(params, |r| handlers::token::handle_approve(economy, r)).await,
            "token/allowance" => {
                dispatch_handler(params, |r| handlers::token::handle_allowance(economy, r)).await
            }

            // Staking asset
            "lp/balance" => dispatch_handler(params, |r| handlers::lp::handle_balance(economy, r)).await,
            "lp/approve" => dispatch_handler(params, |r| handlers::lp::handle_approve(economy, r)).await,

            // Vault
            "vault/info" => dispatch_handler(params, |r| handlers::vault::handle_info(economy, r)).await,
            "vault/stake" => dispatch_handler(params, |r| handlers::vault::handle_stake(economy, r)).await,
            "vault/withdraw" => dispatch_handler(params, |r| handlers::vault::handle_withdraw(economy, r)).await,
            "vault/pending" => dispatch_handler(params, |r| handlers::vault::handle_pending(economy, r)).await,
            "vault/claim" => dispatch_handler(params, |r| handlers::vault::handle_claim(economy, r)).await,
            "vault/exit" => dispatch_handler(params, |r| handlers::vault::handle_exit(economy, r)).await,
            "vault/position" => dispatch_handler(params, |r| handlers::vault::handle_position(economy, r)).await,
            "vault/epoch" => dispatch_handler(params, |r| handlers::vault::handle_epoch(economy, r)).await,
            "vault/epochs" => dispatch_handler(params, |r| handlers::vault::handle_epochs(economy, r)).await,

            // Governance
            "gov/transfer_fee" => dispatch_handler(params, |r| handlers::gov::handle_transfer_fee(economy, r)).await,
            "gov/reward_pool" => dispatch_handler(params, |r| handlers::gov::handle_reward_pool(economy, r)).await,
            "gov/presale" => dispatch_handler(params, |r| handlers::gov::handle_presale(economy, r)).await,
            "gov/pause" => dispatch_handler(params, |r| handlers::gov::handle_pause(economy, r)).await,
            "gov/unpause" => dispatch_handler(params, |r| handlers::gov::handle_unpause(economy, r)).await,
            "gov/token_owner" => dispatch_handler(params, |r| handlers::gov::handle_token_owner(economy, r)).await,
            "gov/reward_period" => {
                dispatch_handler(params, |r| handlers::gov::handle_reward_period(economy, r)).await
            }
            "gov/dev_fee" => dispatch_handler(params, |r| handlers::gov::handle_dev_fee(economy, r)).await,
            "gov/dev_fee_receiver" => {
                dispatch_handler(params, |r| handlers::gov::handle_dev_fee_receiver(economy, r)).await
            }
            "gov/staking_asset" => {
                dispatch_handler(params, |r| handlers::gov::handle_staking_asset(economy, r)).await
            }
            "gov/reward_asset" => {
                dispatch_handler(params, |r| handlers::gov::handle_reward_asset(economy, r)).await
            }
            "gov/vault_owner" => dispatch_handler(params, |r| handlers::gov::handle_vault_owner(economy, r)).await,
            "gov/collect_dev_fees" => {
                dispatch_handler(params, |r| handlers::gov::handle_collect_dev_fees(economy, r)).await
            }

            // Node
            "node/info" => {
                let uptime = self.start_time.elapsed().as_secs();
                dispatch_handler(params, |r| handlers::node::handle_get_node_info(economy, r, uptime)).await
            }
            "node/health" => dispatch_handler(params, |r| handlers::node::handle_get_health(economy, r)).await,

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => {
                tracing::debug!("RPC {} failed: {}", request.method, err);
                JsonRpcResponse::failure(err)
            }
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    // Parameterless methods may omit params entirely.
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One service with one method. The request and response bodies are raw
// JSON-encoded JsonRpcRequest/JsonRpcResponse bytes.

#[derive(Clone)]
pub struct NeonJsonRpcServer {
    inner: NeonServiceImpl,
}

impl std::fmt::Debug for NeonJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeonJsonRpcServer").finish()
    }
}

impl NeonJsonRpcServer {
    fn new(inner: NeonServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for NeonJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for NeonJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::failure(format!("Failed to read request body: {}", e));
                    return Ok(build_response(serde_json::to_vec(&resp).unwrap_or_default()));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::failure(format!("Invalid JSON-RPC request: {}", e));
                    return Ok(build_response(serde_json::to_vec(&resp).unwrap_or_default()));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(serde_json::to_vec(&rpc_response).unwrap_or_default()))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP 200 response with the given JSON body.
fn build_response(json: Vec<u8>) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
