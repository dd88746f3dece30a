//! Nibblix Edge Gateway
//!
//! A hardened HTTP edge service that fronts the Nibblix web application.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 EDGE GATEWAY                  │
//!                       │                                               │
//!   Client Request      │  ┌─────────┐    ┌──────────────────────────┐ │
//!   ────────────────────┼─▶│  http   │───▶│ security header policy   │ │
//!                       │  │ server  │    │ (path + prefetch matcher)│ │
//!                       │  └─────────┘    └────────────┬─────────────┘ │
//!                       │                               │               │
//!                       │                               ▼               │
//!   Client Response     │  ┌──────────────┐    ┌──────────────┐        │
//!   ◀───────────────────┼──│ header set   │◀───│  forward to  │◀───────┼──── App
//!                       │  │ (if matched) │    │   upstream   │        │    Server
//!                       │  └──────────────┘    └──────────────┘        │
//!                       │                                               │
//!                       │  ┌─────────────────────────────────────────┐ │
//!                       │  │          Cross-Cutting Concerns          │ │
//!                       │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐ │ │
//!                       │  │  │ config │ │ env schema  │ │ logging │ │ │
//!                       │  │  └────────┘ └─────────────┘ └─────────┘ │ │
//!                       │  └─────────────────────────────────────────┘ │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Startup is fail-fast: the process refuses to run with an invalid
//! environment or configuration.

use std::path::Path;

use tokio::net::TcpListener;

use nibblix_edge::config::env::RuntimeEnv;
use nibblix_edge::config::loader::load_config;
use nibblix_edge::config::EdgeConfig;
use nibblix_edge::http::HttpServer;
use nibblix_edge::observability;

const DEFAULT_CONFIG_PATH: &str = "edge.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Validate the environment before anything else; errors are collected
    // and reported together.
    let env = match RuntimeEnv::from_process_env() {
        Ok(env) => env,
        Err(errors) => {
            eprintln!("Invalid environment:");
            for error in &errors {
                eprintln!("  - {error}");
            }
            return Err("environment validation failed".into());
        }
    };

    // Load configuration: explicit path argument, the default file if it
    // exists, or built-in defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => EdgeConfig::default(),
    };

    observability::init_tracing(&config.observability.log_level);
    observability::install_panic_hook();

    tracing::info!("nibblix-edge v0.1.0 starting");
    tracing::info!(
        environment = env.environment.as_str(),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        security_headers = config.security.enable_headers,
        cors_origins = env.cors_origins.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config, &env);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
