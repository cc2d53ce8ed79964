use std::sync::Arc;

use helpdesk::auth::SessionStore;
use helpdesk::config::AppConfig;
use helpdesk::llm::{GroqClient, KeyPool, LlmProvider, DEFAULT_BASE_URL};
use helpdesk::logging::init_logging;
use helpdesk::routes::configure_routes;
use helpdesk::state::AppState;
use helpdesk::store::{Store, StoreConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn build_key_pool(config: &AppConfig) -> Result<KeyPool, BoxError> {
    let base_url = config.groq_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

    let mut entries: Vec<(String, Box<dyn LlmProvider>)> = Vec::with_capacity(config.api_keys.len());
    for key in &config.api_keys {
        let client = GroqClient::with_base_url(key.clone(), base_url)?;
        entries.push((key.clone(), Box::new(client)));
    }

    Ok(KeyPool::new(entries)?)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.model,
        api_keys = config.api_keys.len(),
        "Starting helpdesk"
    );

    let store_config = StoreConfig::from_connection_string(&config.database_url)?
        .with_max_pool_size(config.db_pool_size);
    let store = Arc::new(Store::new(store_config).await?);
    let seeded = store.init_schema().await?;
    if seeded > 0 {
        tracing::info!(entries = seeded, "Seeded knowledge base");
    }

    let keys = Arc::new(build_key_pool(&config)?);
    let sessions = SessionStore::new(config.admin_password.clone());
    let state = AppState::new(store, keys, sessions, config.chat_settings());

    let addr = config.socket_addr();
    tracing::info!(%addr, "Listening");
    warp::serve(configure_routes(state)).run(addr).await;

    Ok(())
}
