//! CIM-RS gateway — entry point.
//!
//! # Configuration
//!
//! When `CIMRS_CONFIG` names a TOML/YAML/JSON file it is loaded and
//! `CIMRS_*` variables override its values. Without it the defaults apply,
//! again overridable through the environment:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CIMRS_CONFIG` | *(none)* | Path of the configuration file. |
//! | `CIMRS_BIND_ADDRESS` | `0.0.0.0` | Interface to bind. |
//! | `CIMRS_PORT` | `5988` | TCP port to listen on. |
//! | `CIMRS_ROOT` | `cimrs` | First path segment of resource URIs. |
//! | `CIMRS_REPOSITORY_PATH` | *(none)* | Fixture to seed the repository from. |
//! | `RUST_LOG` | `cimrs_gateway=info` | `tracing` filter. |

use cimrs_gateway::config::GatewayServerConfig;
use cimrs_gateway::repository::{InMemoryRepository, load_fixture};
use cimrs_gateway::server::GatewayServer;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = match std::env::var("CIMRS_CONFIG") {
        Ok(path) => GatewayServerConfig::load(&path),
        Err(_) => GatewayServerConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid gateway configuration: {e}");
            std::process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let repository = match &config.repository_path {
        Some(path) => match load_fixture(path) {
            Ok(repo) => repo,
            Err(report) => {
                eprintln!("Failed to load repository: {report:?}");
                std::process::exit(1);
            }
        },
        None => {
            warn!("no repository_path configured, serving an empty repository");
            InMemoryRepository::new()
        }
    };

    info!(
        addr = %config.listen_addr(),
        root = %config.root,
        repository = ?config.repository_path,
        "CIM-RS gateway configuration loaded"
    );

    let server = GatewayServer::new(config);
    if let Err(e) = server.start(Arc::new(repository)).await {
        eprintln!("Gateway error: {e}");
        std::process::exit(1);
    }
}
