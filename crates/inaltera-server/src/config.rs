use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use inaltera_quota::Plan;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// How long a writer may wait for a tenant's lock before the request
    /// fails as retryable.
    pub write_timeout_ms: u64,
    /// Plan applied to tenants that have not been enrolled yet.
    pub default_plan: Plan,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".parse().unwrap(),
            write_timeout_ms: 5_000,
            default_plan: Plan::Free,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
