//! JSON-RPC transport subsystem.
//!
//! # Data Flow
//! ```text
//! Health probe
//!     → RpcRequest {method, params: [], id, jsonrpc: "2.0"}
//!     → RpcTransport::call (http.rs: POST over reqwest)
//!     → result value or TransportError
//! ```
//!
//! # Design Decisions
//! - Trait seam so health logic can be tested with scripted transports
//! - Every transport-level problem is a `TransportError`; the health
//!   checker decides what it means

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcRequest {
    pub method: &'static str,
    pub params: Vec<Value>,
    pub id: u64,
    pub jsonrpc: &'static str,
}

impl RpcRequest {
    /// Request without parameters.
    pub fn new(method: &'static str, id: u64) -> Self {
        Self {
            method,
            params: Vec::new(),
            id,
            jsonrpc: "2.0",
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    /// Extract the result, mapping error members and missing results.
    pub fn into_result(self) -> Result<Value, TransportError> {
        if let Some(err) = self.error {
            return Err(TransportError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result
            .ok_or_else(|| TransportError::Malformed("response has no result".into()))
    }
}

/// Errors raised while talking to an endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    /// Body was not a JSON-RPC response.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Capability to issue a JSON-RPC call against an endpoint URI.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, uri: &str, request: &RpcRequest) -> Result<Value, TransportError>;
}
