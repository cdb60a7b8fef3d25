use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use idealens::config::Config;
use idealens::http::{start_http_server, AppState};
use idealens::llm::create_generator;
use idealens::store::CreditStore;

#[tokio::main]
async fn main() -> Result<()> {
    idealens::load_env();

    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!("Starting idealens report service");

    let generator = create_generator(&config)?;

    let store = match &config.credits.database_url {
        Some(url) => {
            let store = CreditStore::connect(url).await?;
            info!("Credits ledger connected at {}", url);
            Some(store)
        }
        None => {
            info!("No credits database configured; running without a ledger");
            None
        }
    };

    let state = AppState {
        config: Arc::new(config),
        generator,
        store,
    };

    start_http_server(state).await?;

    Ok(())
}
