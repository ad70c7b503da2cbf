//! Shared fakes for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use route_context::{
    ContextState, LoadError, Location, Navigator, Notice, Notifier, Organization, Redirect,
    ResourceClient, RouteSynchronizer, Session, SyncConfig, User, UserRole,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("route_context=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Resource client serving canned payloads, counting calls per path.
#[derive(Default)]
pub struct FakeClient {
    responses: Mutex<HashMap<String, Result<Value, LoadError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn respond(&self, path: &str, response: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), Ok(response));
    }

    pub fn fail(&self, path: &str, error: LoadError) {
        self.responses.lock().unwrap().insert(path.to_string(), Err(error));
    }

    /// Fetches of `path` block until the returned gate is notified.
    pub fn gate(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(path.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
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

pub struct FakeSession {
    pub user: Mutex<Option<User>>,
    /// What `load_user_institutes` returns.
    pub remote_institutes: Mutex<Vec<Organization>>,
    pub institute_loads: Mutex<usize>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeSession {
    pub fn parent(institutes: Vec<Organization>) -> Self {
        FakeSession {
            user: Mutex::new(Some(User {
                id: "U1".into(),
                name: "Dana".to_string(),
                role: UserRole::Parent,
                institutes: institutes.clone(),
            })),
            remote_institutes: Mutex::new(institutes),
            institute_loads: Mutex::new(0),
            gate: Mutex::new(None),
        }
    }

    /// `load_user_institutes` blocks until the returned gate is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn sign_out(&self) {
        *self.user.lock().unwrap() = None;
    }
}

#[async_trait]
impl Session for FakeSession {
    fn user(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    async fn load_user_institutes(&self) -> Result<Vec<Organization>, LoadError> {
        *self.institute_loads.lock().unwrap() += 1;
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.remote_institutes.lock().unwrap().clone())
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

pub struct Harness {
    pub sync: Arc<RouteSynchronizer>,
    pub client: Arc<FakeClient>,
    pub session: Arc<FakeSession>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(institutes: Vec<Organization>) -> Self {
        init_tracing();
        let client = Arc::new(FakeClient::default());
        let session = Arc::new(FakeSession::parent(institutes));
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = ContextState::new(
            SyncConfig::default(),
            client.clone(),
            session.clone(),
            navigator.clone(),
            notifier.clone(),
        );
        Harness {
            sync: Arc::new(RouteSynchronizer::new(state)),
            client,
            session,
            navigator,
            notifier,
        }
    }

    pub fn state(&self) -> &ContextState {
        self.sync.state()
    }

    /// Navigate and wait for background loads.
    pub async fn visit(&self, href: &str) {
        self.sync.on_navigation(&Location::parse(href)).await;
        self.sync.settle().await;
    }

    pub fn redirects(&self) -> Vec<Redirect> {
        self.navigator.redirects.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notifier.notices.lock().unwrap().clone()
    }
}
