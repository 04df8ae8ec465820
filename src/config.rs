/// Service configuration loader - parses service.toml
///
/// Separates runtime tuning (port, worker count, pool sizing) from code so
/// an operator can adjust them without recompiling. The file is optional;
/// every field has a default matching the original deployment profile.

use crate::db::PoolConfig;
use serde::Deserialize;
use std::fs;

/// Runtime settings loaded from service.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP endpoint binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request worker threads. Each worker checks a connection out of the
    /// pool per request, so values above the pool size add little.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Connection pool tuning.
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    4
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            workers: default_workers(),
            pool: PoolConfig::default(),
        }
    }
}

/// Loads service configuration from the given path.
///
/// A missing file is fine — defaults apply. A file that exists but does not
/// parse is fatal: the service must not start with config it cannot honor.
///
/// # Panics
/// Panics if the file exists and is malformed.
pub fn load_config(path: &str) -> ServiceConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return ServiceConfig::default(),
    };

    toml::from_str(&contents).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}
