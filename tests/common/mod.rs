//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rpc_reactor::config::{HealthCheckConfig, NetworkConfig, ReactorConfig};

/// Start a programmable JSON-RPC backend on an ephemeral port.
///
/// `f` receives the request's `method` and returns status and body.
pub async fn start_rpc_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(method) = read_method(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(method).await;
                        let status_text = match status {
                            200 => "200 OK",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend answering every probe healthily.
pub async fn start_healthy_backend() -> SocketAddr {
    start_rpc_backend(|method| async move { (200, healthy_reply(&method)) }).await
}

/// Backend answering every request with `status`.
pub async fn start_failing_backend(status: u16) -> SocketAddr {
    start_rpc_backend(move |_| async move { (status, "{}".to_string()) }).await
}

/// Backend that never answers.
pub async fn start_hanging_backend() -> SocketAddr {
    start_rpc_backend(|_| async move {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        (200, String::new())
    })
    .await
}

pub fn healthy_reply(method: &str) -> String {
    match method {
        "net_peerCount" => rpc_result(74, json!("0x19")),
        _ => rpc_result(67, json!(false)),
    }
}

pub fn rpc_result(id: u64, result: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string()
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

/// Single-network config with a 1 second probe timeout.
pub fn network_config(primary: Vec<String>, fallback: Vec<String>) -> ReactorConfig {
    ReactorConfig {
        networks: vec![NetworkConfig {
            network_id: 56,
            chain_name: "BNB Smart Chain".into(),
            rpc_urls: primary,
            fallback_rpc_urls: fallback,
            native_currency: None,
            block_explorer_urls: Vec::new(),
        }],
        health_check: HealthCheckConfig {
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        },
        ..ReactorConfig::default()
    }
}

async fn read_method(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body: Value = serde_json::from_slice(&buf[header_end..]).ok()?;
    body.get("method")?.as_str().map(str::to_string)
}
