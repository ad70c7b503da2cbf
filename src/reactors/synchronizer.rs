//! Route synchronizer: feeds each navigation to the downward and upward reactors in order.

use crate::navigation::Location;
use crate::reactors::downward::clear_for_route;
use crate::reactors::upward::{UpwardOutcome, UpwardSync};
use crate::routes::{RouteIdentifiers, RouteSnapshot};
use crate::session::SessionIdentity;
use crate::state::ContextState;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Route identifiers plus whether the first upward pass is still running.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteContext {
    pub organization_id: Option<String>,
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub child_id: Option<String>,
    pub is_validating: bool,
}

#[derive(Default)]
struct Observed {
    path: Option<String>,
    upward_inputs: Option<(RouteIdentifiers, SessionIdentity)>,
}

pub struct RouteSynchronizer {
    state: ContextState,
    upward: UpwardSync,
    latest: Arc<RwLock<RouteSnapshot>>,
    observed: Mutex<Observed>,
    validating: AtomicBool,
}

impl RouteSynchronizer {
    pub fn new(state: ContextState) -> Self {
        let latest = Arc::new(RwLock::new(RouteSnapshot::default()));
        RouteSynchronizer {
            upward: UpwardSync::new(state.clone(), latest.clone()),
            state,
            latest,
            observed: Mutex::new(Observed::default()),
            validating: AtomicBool::new(true),
        }
    }

    pub fn state(&self) -> &ContextState {
        &self.state
    }

    /// Handle one navigation. Downward clearing runs first and only when the path changed; the
    /// upward pass runs when the route identifiers or the session identity changed.
    pub async fn on_navigation(&self, location: &Location) -> RouteContext {
        let route = RouteSnapshot::observe(location, &self.state.config);
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = route.clone();

        let identity = SessionIdentity::of(self.state.session.user().as_ref());
        let (path_changed, inputs_changed, session_ended) = {
            let mut observed = self.observed.lock().unwrap_or_else(PoisonError::into_inner);
            let path_changed = observed.path.as_deref() != Some(route.path.as_str());
            observed.path = Some(route.path.clone());

            let was_signed_in = observed
                .upward_inputs
                .as_ref()
                .map(|(_, who)| who.is_signed_in())
                .unwrap_or(false);
            let inputs = (route.identifiers(), identity.clone());
            let inputs_changed = observed.upward_inputs.as_ref() != Some(&inputs);
            observed.upward_inputs = Some(inputs);
            (path_changed, inputs_changed, was_signed_in && !identity.is_signed_in())
        };

        if session_ended {
            self.end_session();
        }
        if path_changed {
            clear_for_route(&route, &self.state.store);
        }
        if inputs_changed && identity.is_signed_in() {
            let outcome = self.upward.run(&route).await;
            tracing::debug!(path = %route.path, outcome = ?outcome, "upward sync pass");
        }
        self.validating.store(false, Ordering::Release);
        self.context_for(&route)
    }

    /// Re-read the navigator's location and handle it as a navigation.
    pub async fn sync_current(&self) -> RouteContext {
        let location = self.state.navigator.location();
        self.on_navigation(&location).await
    }

    /// Force an upward pass for the current route even though nothing changed.
    pub async fn refresh(&self) -> UpwardOutcome {
        let route = self.route();
        self.upward.run(&route).await
    }

    /// Wait for background class and subject loads.
    pub async fn settle(&self) {
        self.upward.settle().await;
    }

    pub fn is_validating(&self) -> bool {
        self.validating.load(Ordering::Acquire)
    }

    pub fn route(&self) -> RouteSnapshot {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn context(&self) -> RouteContext {
        self.context_for(&self.route())
    }

    fn context_for(&self, route: &RouteSnapshot) -> RouteContext {
        RouteContext {
            organization_id: route.organization_id.clone(),
            class_id: route.class_id.clone(),
            subject_id: route.subject_id.clone(),
            child_id: route.child_id.clone(),
            is_validating: self.is_validating(),
        }
    }

    fn end_session(&self) {
        tracing::info!("session ended; clearing selection");
        self.state.store.reset();
        self.state.loader.clear();
    }
}
