//! Shared state for the reactors: one selection store and one loader per session, plus the
//! host's collaborators.

use crate::config::SyncConfig;
use crate::navigation::{Navigator, Notifier};
use crate::service::{ResourceClient, ResourceLoader};
use crate::session::Session;
use crate::store::SelectionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct ContextState {
    pub config: Arc<SyncConfig>,
    pub store: Arc<SelectionStore>,
    pub loader: Arc<ResourceLoader>,
    pub session: Arc<dyn Session>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl ContextState {
    /// Fresh, empty selection store and loader cache for a new session.
    pub fn new(
        config: SyncConfig,
        client: Arc<dyn ResourceClient>,
        session: Arc<dyn Session>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ContextState {
            config: Arc::new(config),
            store: Arc::new(SelectionStore::new()),
            loader: Arc::new(ResourceLoader::new(client)),
            session,
            navigator,
            notifier,
        }
    }
}
