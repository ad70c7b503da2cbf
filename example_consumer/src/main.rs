//! Example consumer: a separate Rust project that uses route-context as a dependency.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use async_trait::async_trait;
use route_context::{
    ContextState, LoadError, Location, Navigator, Organization, Redirect, ResourceClient,
    RouteSynchronizer, Session, SyncConfig, TracingNotifier, User, UserRole,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Canned back end standing in for the HTTP client.
struct FixtureClient;

#[async_trait]
impl ResourceClient for FixtureClient {
    async fn get(&self, path: &str) -> Result<Value, LoadError> {
        match path {
            "/parents/children" => Ok(json!({ "data": [{ "id": "CH1", "userId": "U42", "name": "Mia" }] })),
            "/institutes/N1/classes/C1" => Ok(json!({ "data": { "id": 1, "className": "Grade 5A", "grade": 5, "section": "A" } })),
            "/classes/C1/subjects/S1" => Ok(json!({ "id": "S1", "name": "Mathematics", "isActive": true })),
            _ => Err(LoadError::NotFound(path.to_string())),
        }
    }
}

struct FixtureSession {
    user: User,
}

#[async_trait]
impl Session for FixtureSession {
    fn user(&self) -> Option<User> {
        Some(self.user.clone())
    }

    async fn load_user_institutes(&self) -> Result<Vec<Organization>, LoadError> {
        Ok(self.user.institutes.clone())
    }
}

/// Logs redirects and remembers the last location.
#[derive(Default)]
struct LoggingNavigator {
    current: Mutex<Location>,
}

impl Navigator for LoggingNavigator {
    fn location(&self) -> Location {
        self.current.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn redirect(&self, redirect: Redirect) {
        tracing::info!(to = %redirect.to, replace = redirect.replace, "redirect requested");
        if let Ok(mut current) = self.current.lock() {
            *current = Location::parse(&redirect.to);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("route_context=info")),
        )
        .init();

    let config = SyncConfig::from_env()?;
    let session = FixtureSession {
        user: User {
            id: "U1".into(),
            name: "Dana".to_string(),
            role: UserRole::Parent,
            institutes: vec![Organization::new("N1", "North Academy")],
        },
    };
    let navigator = Arc::new(LoggingNavigator::default());
    let state = ContextState::new(
        config,
        Arc::new(FixtureClient),
        Arc::new(session),
        navigator.clone(),
        Arc::new(TracingNotifier),
    );
    let sync = RouteSynchronizer::new(state);

    let script = [
        "/institute/N1/class/C1/subject/S1",
        "/institute/N1/select-class",
        "/institute/N1/class/C1/subject/S1/parents?tab=all",
        "/child/U42/select-institute",
        "/institute/Z9/dashboard",
    ];
    for href in script {
        let location = Location::parse(href);
        *navigator.current.lock().map_err(|e| e.to_string())? = location.clone();
        let mut context = sync.on_navigation(&location).await;
        // Follow a redirect the same way a router would.
        if navigator.location() != location {
            context = sync.sync_current().await;
        }
        sync.settle().await;

        let selection = sync.state().store.snapshot();
        let context = serde_json::to_string(&context)?;
        tracing::info!(
            route = href,
            context = %context,
            institute = ?selection.organization.as_ref().map(|o| o.name.as_str()),
            class = ?selection.class.as_ref().map(|c| c.name.as_str()),
            subject = ?selection.subject.as_ref().map(|s| s.name.as_str()),
            child = ?selection.child.as_ref().map(|c| c.name.as_str()),
            "selection after navigation"
        );
    }
    Ok(())
}
