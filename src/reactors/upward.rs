//! Upward sync: select the entities the route names but the store does not hold yet.
//!
//! Resolution order is child, institute, class, subject. A failed institute stops the pass with
//! a redirect; child, class and subject failures are logged and leave the UI with what it has.
//! Class and subject records load in the background; before writing, each load checks that the
//! current route still names it and silently drops the result otherwise. Class and subject ids are
//! taken from the latest route once the institute is settled, not from the route the pass began
//! with.

use crate::error::{LoadError, SyncError};
use crate::model::{Child, ClassInfo, Subject};
use crate::navigation::{Location, Notice, Redirect};
use crate::response::unwrap_list;
use crate::routes::{paths, RouteSnapshot};
use crate::service::{Claim, FetchKey, InFlight, Pending};
use crate::session::User;
use crate::state::ContextState;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpwardOutcome {
    /// Everything the route names is selected or loading in the background.
    Synced,
    Redirected(String),
    NoSession,
    /// The route moved to another institute, or the institute was rejected by another pass.
    Superseded,
}

#[derive(Clone)]
pub struct UpwardSync {
    state: ContextState,
    latest: Arc<RwLock<RouteSnapshot>>,
    /// Per-step guard: a step already in flight for the same key is skipped.
    steps: Arc<InFlight<()>>,
    background: Arc<Mutex<JoinSet<()>>>,
}

impl UpwardSync {
    /// `latest` is the route as last observed; background loads compare against it before writing.
    pub fn new(state: ContextState, latest: Arc<RwLock<RouteSnapshot>>) -> Self {
        UpwardSync {
            state,
            latest,
            steps: InFlight::new(),
            background: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub async fn run(&self, route: &RouteSnapshot) -> UpwardOutcome {
        let Some(user) = self.state.session.user() else {
            return UpwardOutcome::NoSession;
        };

        if route.parents_view && route.subject_id.is_some() {
            if let Some(path) = route.without_subject(&self.state.config) {
                let target = Location {
                    path,
                    query: route.query.clone(),
                }
                .href();
                tracing::info!(from = %route.path, to = %target, "parents view takes no subject; redirecting");
                self.state.navigator.redirect(Redirect::replace(target.clone()));
                return UpwardOutcome::Redirected(target);
            }
        }

        if let Some(child_id) = route.child_id.as_deref() {
            self.resolve_child(child_id).await;
        }

        let Some(organization_id) = route.organization_id.as_deref() else {
            return UpwardOutcome::Synced;
        };
        match self.resolve_organization(&user, organization_id).await {
            Ok(true) => {}
            Ok(false) => return UpwardOutcome::Superseded,
            Err(err) => return self.reject_organization(organization_id, err),
        }

        // Resolving the institute may have awaited; continue with what the route names now.
        let current = self.current_route();
        if current.organization_id.as_deref() != Some(organization_id) {
            return UpwardOutcome::Superseded;
        }
        if let Some(class_id) = current.class_id.as_deref() {
            self.resolve_class(organization_id, class_id);
            match current.subject_id.as_deref() {
                Some(subject_id) if !current.parents_view => {
                    self.resolve_subject(organization_id, class_id, subject_id)
                }
                _ => {}
            }
        }
        UpwardOutcome::Synced
    }

    /// Wait for every background class/subject load started so far.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *self.background.lock().unwrap_or_else(PoisonError::into_inner));
            if tasks.is_empty() {
                return;
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "background selection load did not complete");
                }
            }
        }
    }

    /// Children are looked up in the session user's accessible-children list. Not finding one is
    /// soft: logged, nothing selected, no redirect.
    async fn resolve_child(&self, child_id: &str) {
        let current = self.state.store.snapshot();
        if let Some(child) = current.child.filter(|c| c.answers_to(child_id)) {
            if !current.viewing_as_child {
                self.state.store.set_child(Some(child), true);
            }
            return;
        }
        let Claim::Leader(_guard) = self.steps.claim(FetchKey::child(child_id)) else {
            return;
        };

        let children = match self.state.loader.get(&self.state.config.children_path).await {
            Ok(payload) => Child::list_from_payloads(unwrap_list(payload)),
            Err(e) => {
                log_soft_failure("child", child_id, &e);
                return;
            }
        };
        match children.into_iter().find(|c| c.answers_to(child_id)) {
            Some(child) if self.routed(|r| r.child_id.as_deref() == Some(child_id)) => {
                tracing::info!(child_id, name = %child.name, "viewing as child from route");
                self.state.store.set_child(Some(child), true);
            }
            Some(_) => tracing::debug!(child_id, "route moved on; discarding child"),
            None => tracing::warn!(child_id, "child not among the session's accessible children"),
        }
    }

    /// `Ok(true)` once the store holds the routed institute; `Ok(false)` when this pass yields.
    /// A pass that finds the institute already being resolved waits for that resolution.
    async fn resolve_organization(&self, user: &User, organization_id: &str) -> Result<bool, SyncError> {
        let store = &self.state.store;
        if self.organization_selected(organization_id) {
            return Ok(true);
        }
        let pending = match self.steps.claim(FetchKey::organization(organization_id)) {
            Claim::Leader(pending) => pending,
            Claim::Joined(waiter) => {
                tracing::debug!(organization_id, "waiting on institute resolution in flight");
                waiter.wait().await;
                return Ok(self.organization_selected(organization_id));
            }
        };

        let organization = match user.institute(organization_id) {
            Some(known) => known.clone(),
            None => {
                tracing::debug!(organization_id, "institute not in session list; loading");
                self.state
                    .session
                    .load_user_institutes()
                    .await?
                    .into_iter()
                    .find(|o| o.id.matches(organization_id))
                    .ok_or_else(|| SyncError::AccessDenied {
                        organization_id: organization_id.to_string(),
                    })?
            }
        };

        if !self.routed(|r| r.organization_id.as_deref() == Some(organization_id)) {
            tracing::debug!(organization_id, "route moved on; discarding institute");
            return Ok(false);
        }
        tracing::info!(organization_id, name = %organization.name, "selected institute from route");
        store.set_organization(Some(organization));
        pending.settle(());
        Ok(true)
    }

    fn reject_organization(&self, organization_id: &str, err: SyncError) -> UpwardOutcome {
        if !self.routed(|r| r.organization_id.as_deref() == Some(organization_id)) {
            return UpwardOutcome::Superseded;
        }
        let notice = match &err {
            SyncError::AccessDenied { .. } => {
                tracing::warn!(organization_id, "no access to institute");
                Notice::AccessDenied {
                    organization_id: organization_id.to_string(),
                }
            }
            SyncError::Load(e) => {
                tracing::error!(organization_id, kind = e.kind(), error = %e, "loading institutes failed");
                Notice::LoadFailed {
                    organization_id: organization_id.to_string(),
                }
            }
        };
        let target = paths::select_organization(&self.state.config);
        self.state.notifier.notify(notice);
        self.state.navigator.redirect(Redirect::replace(target.clone()));
        UpwardOutcome::Redirected(target)
    }

    /// Writes a provisional class right away, then overwrites it when the record arrives.
    fn resolve_class(&self, organization_id: &str, class_id: &str) {
        let store = &self.state.store;
        if store
            .snapshot()
            .class_id()
            .map(|id| id.matches(class_id))
            .unwrap_or(false)
        {
            return;
        }
        let resource = paths::class_resource(organization_id, class_id);
        let placeholder = ClassInfo::placeholder(class_id, self.state.config.placeholder_name(class_id));
        if let Some(cached) = self.state.loader.peek(&resource) {
            match ClassInfo::from_payload(&cached, class_id, &placeholder) {
                Ok(class) => store.set_class(Some(class)),
                Err(e) => {
                    log_soft_failure("class", class_id, &e);
                    store.set_class(Some(placeholder))
                }
            };
            return;
        }
        store.set_class(Some(placeholder.clone()));
        tracing::debug!(class_id, "wrote provisional class");

        let Claim::Leader(pending) = self.steps.claim(FetchKey::class(organization_id, class_id)) else {
            return;
        };
        let this = self.clone();
        let (organization_id, class_id) = (organization_id.to_string(), class_id.to_string());
        self.spawn(async move {
            this.load_class(organization_id, class_id, resource, placeholder, pending)
                .await
        });
    }

    async fn load_class(
        self,
        organization_id: String,
        class_id: String,
        resource: String,
        placeholder: ClassInfo,
        _pending: Pending<()>,
    ) {
        let payload = match self.state.loader.get(&resource).await {
            Ok(payload) => payload,
            Err(e) => {
                // The placeholder stays selected.
                log_soft_failure("class", &class_id, &e);
                return;
            }
        };
        let routed = self.routed(|r| {
            r.organization_id.as_deref() == Some(organization_id.as_str())
                && r.class_id.as_deref() == Some(class_id.as_str())
        });
        if !routed || !self.class_selected(&class_id) {
            tracing::debug!(class_id = %class_id, "route moved on; discarding class record");
            return;
        }
        let class = match ClassInfo::from_payload(&payload, &class_id, &placeholder) {
            Ok(class) => class,
            Err(e) => {
                log_soft_failure("class", &class_id, &e);
                return;
            }
        };
        tracing::info!(class_id = %class_id, name = %class.name, "resolved class");
        self.state.store.set_class(Some(class));
        if self.routed(|r| r.subject_id.is_none()) {
            self.state.store.set_subject(None);
        }
    }

    /// Needs the routed class selected (a placeholder is enough). No placeholder for subjects.
    fn resolve_subject(&self, organization_id: &str, class_id: &str, subject_id: &str) {
        let current = self.state.store.snapshot();
        if current.subject_id().map(|id| id.matches(subject_id)).unwrap_or(false) {
            return;
        }
        if !current.class_id().map(|id| id.matches(class_id)).unwrap_or(false) {
            return;
        }
        let Claim::Leader(pending) = self
            .steps
            .claim(FetchKey::subject(organization_id, class_id, subject_id))
        else {
            return;
        };
        let this = self.clone();
        let (class_id, subject_id) = (class_id.to_string(), subject_id.to_string());
        self.spawn(async move { this.load_subject(class_id, subject_id, pending).await });
    }

    async fn load_subject(self, class_id: String, subject_id: String, _pending: Pending<()>) {
        let resource = paths::subject_resource(&class_id, &subject_id);
        let payload = match self.state.loader.get(&resource).await {
            Ok(payload) => payload,
            Err(e) => {
                log_soft_failure("subject", &subject_id, &e);
                return;
            }
        };
        let routed = self.routed(|r| {
            r.class_id.as_deref() == Some(class_id.as_str())
                && r.subject_id.as_deref() == Some(subject_id.as_str())
        });
        if !routed || !self.class_selected(&class_id) {
            tracing::debug!(subject_id = %subject_id, "route moved on; discarding subject record");
            return;
        }
        let subject = match Subject::from_payload(&payload, &subject_id) {
            Ok(subject) => subject,
            Err(e) => {
                log_soft_failure("subject", &subject_id, &e);
                return;
            }
        };
        tracing::info!(subject_id = %subject_id, name = %subject.name, "resolved subject");
        self.state.store.set_subject(Some(subject));
    }

    fn organization_selected(&self, organization_id: &str) -> bool {
        self.state
            .store
            .snapshot()
            .organization_id()
            .map(|id| id.matches(organization_id))
            .unwrap_or(false)
    }

    fn class_selected(&self, class_id: &str) -> bool {
        self.state
            .store
            .snapshot()
            .class_id()
            .map(|id| id.matches(class_id))
            .unwrap_or(false)
    }

    fn current_route(&self) -> RouteSnapshot {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn routed(&self, check: impl FnOnce(&RouteSnapshot) -> bool) -> bool {
        check(&*self.latest.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.background.lock().unwrap_or_else(PoisonError::into_inner);
        // Reap finished loads so the set does not grow for the whole session.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }
}

fn log_soft_failure(entity: &'static str, id: &str, e: &LoadError) {
    if e.is_transport() {
        tracing::error!(entity, id, kind = e.kind(), error = %e, "selection load failed");
    } else {
        tracing::warn!(entity, id, kind = e.kind(), error = %e, "selection entity unavailable");
    }
}
