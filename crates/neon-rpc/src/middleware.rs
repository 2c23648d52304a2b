// crates/neon-rpc/src/middleware.rs
//
// Request logging for the RPC server.

use tonic::{Request, Status};

/// Logging interceptor for incoming tonic requests.
///
/// Callers are identified by the `caller` field of each request body, not by
/// transport metadata, so nothing is rejected here.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::debug!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}
