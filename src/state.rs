use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::services::account_service::AccountService;

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone(), self.config.security.clone())
    }
}
