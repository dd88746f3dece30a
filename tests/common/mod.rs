//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use nibblix_edge::config::env::RuntimeEnv;
use nibblix_edge::config::EdgeConfig;
use nibblix_edge::http::HttpServer;

/// Start a simple mock upstream that returns a fixed HTML response on every
/// path.
pub async fn start_mock_upstream(addr: SocketAddr, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// A complete, valid runtime environment for tests.
pub fn test_runtime_env() -> RuntimeEnv {
    let vars: HashMap<String, String> = [
        ("NIBBLIX_ENV", "local"),
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "test-anon-key"),
        ("CORS_ORIGINS", "http://localhost:3000"),
        ("REDIS_URL", "redis://127.0.0.1:6379"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    RuntimeEnv::validate(&vars).unwrap()
}

/// Start the edge gateway on `edge_addr`, forwarding to `upstream_addr`.
pub async fn start_edge(edge_addr: SocketAddr, upstream_addr: SocketAddr) {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = edge_addr.to_string();
    config.upstream.address = upstream_addr.to_string();
    config.debug.expose_error_route = true;

    let env = test_runtime_env();
    let server = HttpServer::new(config, &env);
    let listener = TcpListener::bind(edge_addr).await.unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    wait_until_ready(edge_addr).await;
}

/// Poll the health endpoint until the edge answers.
pub async fn wait_until_ready(addr: SocketAddr) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(res) = client.get(format!("http://{addr}/health")).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("edge at {addr} did not become ready");
}
