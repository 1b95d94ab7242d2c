//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::module::{Module, ModuleContext};
use crate::core::store::DocumentStore;
use anyhow::{Result, bail};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered routes
///
/// Modules are registered lazily: their controllers are built in
/// [`build_host`](Self::build_host), once the store and configuration are known.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryDocumentStore::new())
///     .register_module(ErpModule::new())?
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    config: AppConfig,
    modules: Vec<Arc<dyn Module>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            config: AppConfig::default_config(),
            modules: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the document store (required)
    pub fn with_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set an already shared document store
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the configuration (defaults to [`AppConfig::default_config`])
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this to add routes that don't fit the CRUD pattern, such as
    /// reports or webhooks. They are merged at the top level, outside the
    /// API prefix.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a module
    ///
    /// Fails when a module with the same name was already registered.
    pub fn register_module(mut self, module: impl Module + 'static) -> Result<Self> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            bail!("Module '{}' is already registered", module.name());
        }
        self.modules.push(Arc::new(module));
        Ok(self)
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("DocumentStore is required. Call .with_store()"))?;

        let ctx = ModuleContext {
            store: store.clone(),
            settings: self.config.controller_settings(),
        };

        let mut registry = EntityRegistry::new();
        for module in &self.modules {
            module.register_entities(&mut registry, &ctx)?;
            tracing::info!(
                module = module.name(),
                version = module.version(),
                entities = ?module.entity_types(),
                "module registered"
            );
        }

        Ok(ServerHost::new(self.config, store, registry))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install signal handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
