use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::events::SessionEvents;
use crate::refresh::{spawn_refresh_loop, RefreshCoordinator, RefreshLoopHandle};
use crate::state::{SessionStorage, SessionStore};
use std::sync::Arc;

/// Wires the session store, refresh coordinator and API client together over
/// an injected storage backend. The host keeps this alive for the lifetime of
/// the tab/session.
pub struct App {
    config: Config,
    store: SessionStore,
    events: SessionEvents,
    coordinator: Arc<RefreshCoordinator>,
    api: ApiClient,
}

impl App {
    pub fn new(config: Config, storage: Arc<dyn SessionStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        let store = SessionStore::new(storage);
        let events = SessionEvents::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            http.clone(),
            config.clone(),
            store.clone(),
            events.clone(),
        ));
        let api = ApiClient::new(http, config.clone(), store.clone(), Arc::clone(&coordinator));
        Ok(Self {
            config,
            store,
            events,
            coordinator,
            api,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Start the proactive expiry check. The host stops it at teardown via
    /// the returned handle.
    pub fn spawn_refresh_loop(&self) -> RefreshLoopHandle {
        spawn_refresh_loop(Arc::clone(&self.coordinator), self.config.check_interval)
    }
}
