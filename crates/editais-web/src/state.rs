//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, warn};

use editais_catalog::search::{from_config, TextSearch};
use editais_catalog::{normalize_all, Catalog, LoadOutcome};
use editais_client::{ClientError, EditaisApi};
use editais_common::EditaisConfig;

use crate::sessions::ChatSessions;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: EditaisConfig,
    pub api: Arc<dyn EditaisApi>,
    pub catalog: RwLock<Catalog>,
    pub search: Box<dyn TextSearch>,
    /// One widget per browser, keyed by the chat session cookie.
    pub chats: Mutex<ChatSessions>,
}

impl AppState {
    pub fn new(config: EditaisConfig, api: Arc<dyn EditaisApi>) -> Self {
        let search = from_config(&config.search);
        let chats = ChatSessions::new(&config.chat);
        Self {
            config,
            api,
            catalog: RwLock::new(Catalog::new()),
            search,
            chats: Mutex::new(chats),
        }
    }

    /// Fetch and install the whole collection. The lock is released while
    /// the request is in flight; a load overtaken by a newer one is dropped.
    pub async fn refresh_catalog(&self) -> Result<LoadOutcome, ClientError> {
        let ticket = self.catalog.write().await.begin_load();

        let raw = match self.api.list_notices().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Failed to load notices");
                return Err(e);
            }
        };
        let report = normalize_all(&raw);
        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), "Some notices were rejected");
        }

        Ok(self.catalog.write().await.complete_load(ticket, report))
    }

    /// Reload when the collection is missing or older than `catalog.refresh_secs`.
    pub async fn ensure_catalog(&self) -> Result<(), ClientError> {
        let max_age = Duration::from_secs(self.config.catalog.refresh_secs);
        if self.catalog.read().await.needs_refresh(max_age) {
            self.refresh_catalog().await?;
        }
        Ok(())
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use editais_test_utils::{sample_records, FakeApi};

    #[tokio::test]
    async fn test_refresh_installs_collection() {
        let api = Arc::new(FakeApi::new().with_records(sample_records()));
        let state = AppState::new(EditaisConfig::default(), api.clone());

        let outcome = state.refresh_catalog().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { loaded: 3, rejected: 0 });
        assert_eq!(state.catalog.read().await.notices().len(), 3);

        // Fresh enough: no second fetch.
        state.ensure_catalog().await.unwrap();
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_collection() {
        let api = Arc::new(FakeApi::new().with_records(sample_records()));
        let state = AppState::new(EditaisConfig::default(), api.clone());
        state.refresh_catalog().await.unwrap();

        let failing = Arc::new(FakeApi::new().failing_list(500, "erro interno"));
        let state = AppState { api: failing, ..state };
        assert!(state.refresh_catalog().await.is_err());
        assert_eq!(state.catalog.read().await.notices().len(), 3);
    }
}
