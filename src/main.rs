//! Water ZIP→PWS Service - Query Daemon
//!
//! A server-side daemon that resolves US ZIP codes to public water systems
//! and reports the top contaminants measured for the resolved system, read
//! from a PostgreSQL store populated by the `load_from_csv` binary.
//!
//! Usage:
//!   cargo run --release                          # defaults (port 8080)
//!   cargo run --release -- --port 9090           # override port
//!   cargo run --release -- --config service.toml # explicit config file
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string (loaded from .env if present)

use std::env;
use std::sync::Arc;
use zipwater_service::config;
use zipwater_service::db::Pool;
use zipwater_service::endpoint;

fn main() {
    println!("💧 Water ZIP→PWS Service");
    println!("========================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path = "service.toml".to_string();
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
            }
            "--port" => {
                if i + 1 < args.len() {
                    port_override = args[i + 1].parse().ok();
                    if port_override.is_none() {
                        eprintln!("Error: --port requires a port number");
                        std::process::exit(1);
                    }
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH] [--port PORT]", args[0]);
                std::process::exit(1);
            }
        }
    }

    let service_config = config::load_config(&config_path);
    let port = port_override.unwrap_or(service_config.port);

    // Connect the pool up front so a bad DATABASE_URL fails at startup
    println!("📊 Connecting to store...");
    let pool = match Pool::connect(service_config.pool.clone()) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            eprintln!("\n❌ Store connection failed: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Store reachable\n");

    // Report dataset readiness; the daemon still serves /health and /readyz
    // when the tables are empty, so this is informational only.
    match pool.get().and_then(|mut client| {
        zipwater_service::db::readiness_counts(&mut client)
            .map_err(zipwater_service::db::DbConfigError::ConnectionFailed)
    }) {
        Ok((pws_rows, zip_map_rows)) => {
            println!("📋 Datasets: {} pws rows, {} zip map rows", pws_rows, zip_map_rows);
            if pws_rows == 0 || zip_map_rows == 0 {
                println!("   ⚠ Datasets empty - run: cargo run --bin load_from_csv -- --data <csv> --zipmap <csv>");
            }
            println!();
        }
        Err(e) => {
            eprintln!("⚠ Could not check datasets: {}\n", e);
        }
    }

    println!("🚀 Starting HTTP endpoint ({} workers)...", service_config.workers);
    if let Err(e) = endpoint::start_endpoint_server(port, pool, service_config.workers) {
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
