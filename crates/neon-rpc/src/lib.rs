// crates/neon-rpc/src/lib.rs
//
// neon-rpc: JSON-RPC server and handlers for the NEON economy.
//
// Uses a tonic server for transport with JSON request/response envelopes
// instead of protobuf codegen. Every mutating method takes an explicit
// `caller` address.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{JsonRpcRequest, JsonRpcResponse, NeonRpcServer, RpcConfig, SERVICE_NAME};
