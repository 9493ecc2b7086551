//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PhonebookConfig;
use crate::db::SharedStore;
use crate::graphql::{PhonebookSchema, build_schema};
use crate::services::TokenService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store handle is created once at startup
/// and lives until the process exits.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PhonebookConfig,
    store: SharedStore,
    tokens: TokenService,
    schema: PhonebookSchema,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Store every request reads and writes
    #[must_use]
    pub fn new(config: PhonebookConfig, store: SharedStore) -> Self {
        let tokens = TokenService::new(&config.auth);
        let schema = build_schema(Arc::clone(&store), tokens.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                schema,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &PhonebookConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the GraphQL schema.
    #[must_use]
    pub fn schema(&self) -> &PhonebookSchema {
        &self.inner.schema
    }
}
