use std::sync::Arc;
use tracing::info;

use crate::{
    api::handler::AppState,
    completion::{CompletionWatcher, ResultStore, WatcherConfig},
    config::AgentConfig,
    ledger::{Ledger, LedgerClient},
};

pub fn initialize_app_state(config: &AgentConfig) -> AppState {
    info!("Initializing application components ...");

    let ledger: Arc<dyn Ledger> = Arc::new(LedgerClient::new(
        config.agirails_base_url.clone(),
        config.agent_api_key.clone(),
    ));
    info!("✅ Ledger client ready for {}", config.agirails_base_url);

    let store = Arc::new(ResultStore::new());
    let watcher = Arc::new(CompletionWatcher::new(
        WatcherConfig::from(config),
        ledger.clone(),
        store.clone(),
    ));
    info!(
        "✅ Completion watcher initialized for {} (polling {})",
        config.agent_did,
        if config.polling_enabled { "enabled" } else { "disabled" }
    );

    AppState {
        watcher,
        store,
        ledger,
    }
}
