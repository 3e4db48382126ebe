use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tag_registry::config::Config;
use tag_registry::logging::init_logging;
use tag_registry::server::{self, AppState};
use tag_registry::TagStore;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_logging(config.json_logs);

    let store = TagStore::builder(&config.storage)
        .pretty(config.pretty)
        .build()
        .with_context(|| format!("cannot open storage file {}", config.storage.display()))?;
    let store = Arc::new(store);
    let state = AppState::new(Arc::clone(&store), config.password.as_str());

    let listener = TcpListener::bind((config.host(), config.port))
        .await
        .with_context(|| format!("listen on {}:{}", config.host(), config.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    let served = server::serve(
        listener,
        state,
        server::shutdown_signal(),
        config.shutdown_timeout(),
    )
    .await;
    server::drain_store(store).await?;
    served
}
