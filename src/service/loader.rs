//! Deduplicating, cached read-through loader over a `get(path)` resource client.

use crate::error::LoadError;
use crate::service::inflight::{Claim, FetchKey, InFlight};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Network boundary: fetch one resource by path. Implementations map HTTP 404 to
/// [`LoadError::NotFound`], 401/403 to [`LoadError::Denied`], and connection failures to
/// [`LoadError::Transport`].
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, LoadError>;
}

type FetchOutcome = Result<Value, LoadError>;

pub struct ResourceLoader {
    client: Arc<dyn ResourceClient>,
    cache: RwLock<HashMap<String, Value>>,
    in_flight: Arc<InFlight<FetchOutcome>>,
}

impl ResourceLoader {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        ResourceLoader {
            client,
            cache: RwLock::new(HashMap::new()),
            in_flight: InFlight::new(),
        }
    }

    /// Cached entity, or exactly one fetch per distinct path shared by all concurrent callers.
    /// Only successes are cached.
    pub async fn get(&self, path: &str) -> Result<Value, LoadError> {
        let path = normalize_path(path);
        if let Some(hit) = self.peek(&path) {
            tracing::debug!(path = %path, "resource cache hit");
            return Ok(hit);
        }

        let pending = match self.in_flight.claim(FetchKey::resource(&path)) {
            Claim::Joined(waiter) => {
                tracing::debug!(key = %waiter.key(), "joining in-flight fetch");
                return waiter
                    .wait()
                    .await
                    .unwrap_or_else(|| Err(LoadError::Abandoned(path.clone())));
            }
            Claim::Leader(pending) => pending,
        };

        // A fetch for this path may have settled between the cache check and the claim.
        if let Some(hit) = self.peek(&path) {
            pending.settle(Ok(hit.clone()));
            return Ok(hit);
        }

        tracing::debug!(key = %pending.key(), "fetching resource");
        let outcome = self.client.get(&path).await;
        match &outcome {
            Ok(value) => {
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(path.clone(), value.clone());
            }
            Err(e) if e.is_transport() => {
                tracing::error!(path = %path, kind = e.kind(), error = %e, "resource fetch failed");
            }
            Err(e) => {
                tracing::warn!(path = %path, kind = e.kind(), error = %e, "resource unavailable");
            }
        }
        pending.settle(outcome.clone());
        outcome
    }

    /// Cached entity for `path` without fetching.
    pub fn peek(&self, path: &str) -> Option<Value> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_path(path))
            .cloned()
    }

    pub fn is_in_flight(&self, path: &str) -> bool {
        self.in_flight.contains(&FetchKey::resource(&normalize_path(path)))
    }

    /// Drop one cached entity so the next `get` refetches it.
    pub fn invalidate(&self, path: &str) -> bool {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize_path(path))
            .is_some()
    }

    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Leading slash, no empty segments, no trailing slash, no query string.
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
