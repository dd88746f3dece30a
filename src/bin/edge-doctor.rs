//! Setup doctor for the edge gateway.
//!
//! Checks a developer or deployment environment the same way startup does,
//! but reports findings instead of refusing to run: environment schema,
//! config file, and (optionally) a live probe of a running instance.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use nibblix_edge::config::env::RuntimeEnv;
use nibblix_edge::config::loader::load_config;
use nibblix_edge::security::SecurityHeaders;

#[derive(Parser)]
#[command(name = "edge-doctor")]
#[command(about = "Setup validation for the Nibblix edge gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the process environment against the schema
    Env,
    /// Load and validate a configuration file
    Config {
        /// Path to the TOML config file
        path: PathBuf,
    },
    /// Probe a running edge instance and verify its header policy
    Probe {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ok = match cli.command {
        Commands::Env => check_env(),
        Commands::Config { path } => check_config(&path),
        Commands::Probe { url } => probe(&url).await,
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn check_env() -> bool {
    println!("Validating environment variables...");

    match RuntimeEnv::from_process_env() {
        Ok(env) => {
            println!("OK   environment: {}", env.environment.as_str());
            println!("OK   supabase url: {}", env.supabase_url);
            println!("OK   redis url: {}", env.redis_url);
            println!("OK   cors origins: {}", env.cors_origins.join(", "));
            println!(
                "OK   auth cookie: {} ({}s lifetime)",
                env.auth_cookie_name,
                env.auth_cookie_lifetime.as_secs()
            );
            match env.sentry_dsn {
                Some(_) => println!("OK   error reporting DSN configured"),
                None => println!("note error reporting DSN not set (optional)"),
            }
            println!("\nEnvironment variables are valid.");
            true
        }
        Err(errors) => {
            for error in &errors {
                println!("FAIL {error}");
            }
            println!("\nEnvironment validation failed ({} problem(s)).", errors.len());
            false
        }
    }
}

fn check_config(path: &PathBuf) -> bool {
    println!("Validating config file {}...", path.display());

    match load_config(path) {
        Ok(config) => {
            println!("OK   listener: {}", config.listener.bind_address);
            println!("OK   upstream: {}", config.upstream.address);
            println!(
                "OK   security headers: {}",
                if config.security.enable_headers {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("\nConfiguration is valid.");
            true
        }
        Err(error) => {
            println!("FAIL {error}");
            false
        }
    }
}

async fn probe(url: &str) -> bool {
    let client = reqwest::Client::new();
    let mut ok = true;

    // 1. Liveness.
    match client.get(format!("{url}/health")).send().await {
        Ok(res) if res.status().is_success() => {
            println!("OK   health endpoint answered {}", res.status());
        }
        Ok(res) => {
            println!("FAIL health endpoint answered {}", res.status());
            ok = false;
        }
        Err(error) => {
            println!("FAIL health endpoint unreachable: {error}");
            return false;
        }
    }

    // 2. A page response must carry the full security header set.
    let page = match client.get(format!("{url}/")).send().await {
        Ok(res) => res,
        Err(error) => {
            println!("FAIL page request failed: {error}");
            return false;
        }
    };

    let expected = SecurityHeaders::new();
    for name in expected.names() {
        match page.headers().get(name) {
            Some(_) => println!("OK   {name} present"),
            None => {
                println!("FAIL {name} missing");
                ok = false;
            }
        }
    }

    if let Some(csp) = page
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
    {
        if csp.contains('\n') || csp.contains("  ") {
            println!("FAIL content-security-policy is not a collapsed single line");
            ok = false;
        }
    }

    if ok {
        println!("\nEdge instance at {url} looks healthy.");
    } else {
        println!("\nProbe found problems at {url}.");
    }
    ok
}
