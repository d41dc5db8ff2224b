//! HTTP(S) JSON-RPC transport.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::transport::{RpcRequest, RpcResponse, RpcTransport, TransportError};

/// POSTs JSON-RPC envelopes over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rpc-reactor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, uri: &str, request: &RpcRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(uri)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        // 403 and friends come back as a response, not an error
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        body.into_result()
    }
}
