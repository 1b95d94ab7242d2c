use anyhow::Result;
use erp::config::AppConfig;
use erp::entities::ErpModule;
use erp::server::ServerBuilder;
use erp::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("erp=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let store = storage::open(&config.store).await?;
    let addr = config.server.addr.clone();
    let module = ErpModule::with_entities(config.entities.clone());

    ServerBuilder::new()
        .with_config(config)
        .with_shared_store(store)
        .register_module(module)?
        .serve(&addr)
        .await
}
