//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   addr: 0.0.0.0:8888
//!   api_prefix: /api
//! pagination:
//!   default_items: 10
//!   search_limit: 20
//! entities: [client, invoice, quote, payment, taxes, paymentMode]
//! store:
//!   backend: mongodb
//!   uri: mongodb://localhost:27017
//!   database: erp
//! ```

use crate::crud::ControllerSettings;
use crate::entities::ALL_ENTITIES;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Environment variable naming the YAML file to load
pub const CONFIG_ENV: &str = "ERP_CONFIG";

/// Environment variable overriding the listen address
pub const ADDR_ENV: &str = "ERP_ADDR";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:8888")
    pub addr: String,

    /// Prefix the entity routes are nested under
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8888".to_string(),
            api_prefix: "/api".to_string(),
        }
    }
}

/// List tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_items: usize,
    pub search_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        let settings = ControllerSettings::default();
        Self {
            default_items: settings.default_items,
            search_limit: settings.search_limit,
        }
    }
}

impl From<PaginationConfig> for ControllerSettings {
    fn from(config: PaginationConfig) -> Self {
        Self {
            default_items: config.default_items,
            search_limit: config.search_limit,
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    Mongodb { uri: String, database: String },
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pagination: PaginationConfig,

    /// Entities to expose
    pub entities: Vec<String>,

    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Every entity, in-memory store, default pagination
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            pagination: PaginationConfig::default(),
            entities: ALL_ENTITIES.iter().map(|e| e.to_string()).collect(),
            store: StoreConfig::default(),
        }
    }

    /// Load from `ERP_CONFIG` when set, then apply `ERP_ADDR`
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default_config(),
        };
        if let Ok(addr) = std::env::var(ADDR_ENV) {
            config.server.addr = addr;
        }
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_items == 0 {
            bail!("pagination.default_items must be at least 1");
        }
        if self.pagination.search_limit == 0 {
            bail!("pagination.search_limit must be at least 1");
        }
        if !self.server.api_prefix.starts_with('/') {
            bail!(
                "server.api_prefix must start with '/', got '{}'",
                self.server.api_prefix
            );
        }
        if let Some(unknown) = self
            .entities
            .iter()
            .find(|e| !ALL_ENTITIES.contains(&e.as_str()))
        {
            bail!("unknown entity '{}' in configuration", unknown);
        }
        Ok(())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        self.pagination.into()
    }
}
