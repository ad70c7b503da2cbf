//! In-memory collaborators for reactor unit tests.

use crate::config::SyncConfig;
use crate::error::LoadError;
use crate::model::Organization;
use crate::navigation::{Location, Navigator, Notice, Notifier, Redirect};
use crate::service::ResourceClient;
use crate::session::{Session, User, UserRole};
use crate::state::ContextState;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FixtureClient {
    responses: Mutex<HashMap<String, Result<Value, LoadError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FixtureClient {
    pub fn respond(&self, path: &str, response: Result<Value, LoadError>) {
        self.responses.lock().unwrap().insert(path.to_string(), response);
    }

    /// Hold fetches of `path` until the returned gate is notified.
    pub fn gate(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(path.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl ResourceClient for FixtureClient {
    async fn get(&self, path: &str) -> Result<Value, LoadError> {
        self.calls.lock().unwrap().push(path.to_string());
        let gate = self.gates.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(LoadError::NotFound(path.to_string())))
    }
}

pub struct FixtureSession {
    pub user: Mutex<Option<User>>,
    pub institutes: Mutex<Result<Vec<Organization>, LoadError>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FixtureSession {
    pub fn signed_in(institutes: Vec<Organization>) -> Self {
        FixtureSession {
            user: Mutex::new(Some(User {
                id: "U1".into(),
                name: "Dana".to_string(),
                role: UserRole::Parent,
                institutes: institutes.clone(),
            })),
            institutes: Mutex::new(Ok(institutes)),
            gate: Mutex::new(None),
        }
    }

    /// Hold `load_user_institutes` until the returned gate is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl Session for FixtureSession {
    fn user(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    async fn load_user_institutes(&self) -> Result<Vec<Organization>, LoadError> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.institutes.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub location: Mutex<Location>,
    pub redirects: Mutex<Vec<Redirect>>,
}

impl Navigator for RecordingNavigator {
    fn location(&self) -> Location {
        self.location.lock().unwrap().clone()
    }

    fn redirect(&self, redirect: Redirect) {
        self.redirects.lock().unwrap().push(redirect);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct Fixture {
    pub state: ContextState,
    pub client: Arc<FixtureClient>,
    pub session: Arc<FixtureSession>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    pub fn new(institutes: Vec<Organization>) -> Self {
        let client = Arc::new(FixtureClient::default());
        let session = Arc::new(FixtureSession::signed_in(institutes));
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = ContextState::new(
            SyncConfig::default(),
            client.clone(),
            session.clone(),
            navigator.clone(),
            notifier.clone(),
        );
        Fixture {
            state,
            client,
            session,
            navigator,
            notifier,
        }
    }

    pub fn redirects(&self) -> Vec<Redirect> {
        self.navigator.redirects.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notifier.notices.lock().unwrap().clone()
    }
}
