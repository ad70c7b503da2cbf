//! Selection store: the current institute/class/subject/child selection for one session.
//!
//! Every setter is a synchronous, all-or-nothing state transition that keeps the hierarchy
//! consistent: a class needs an institute, a subject needs a class, and viewing-as-child needs a
//! child. Changing the institute clears class and subject in the same write; changing the class
//! clears the subject.

use crate::model::{Child, ClassInfo, EntityId, Organization, Subject};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub organization: Option<Organization>,
    pub class: Option<ClassInfo>,
    pub subject: Option<Subject>,
    pub child: Option<Child>,
    pub viewing_as_child: bool,
}

impl Selection {
    pub fn organization_id(&self) -> Option<&EntityId> {
        self.organization.as_ref().map(|o| &o.id)
    }

    pub fn class_id(&self) -> Option<&EntityId> {
        self.class.as_ref().map(|c| &c.id)
    }

    pub fn subject_id(&self) -> Option<&EntityId> {
        self.subject.as_ref().map(|s| &s.id)
    }

    pub fn child_id(&self) -> Option<&EntityId> {
        self.child.as_ref().map(|c| &c.id)
    }

    pub fn is_empty(&self) -> bool {
        *self == Selection::default()
    }

    /// Hierarchy invariants: class ⇒ institute, subject ⇒ class, viewing-as-child ⇒ child.
    pub fn holds_invariants(&self) -> bool {
        (self.class.is_none() || self.organization.is_some())
            && (self.subject.is_none() || self.class.is_some())
            && (!self.viewing_as_child || self.child.is_some())
    }

    /// Levels whose value differs between `self` and `other`.
    pub fn changed_levels(&self, other: &Selection) -> Vec<Level> {
        let mut levels = Vec::new();
        if self.organization != other.organization {
            levels.push(Level::Organization);
        }
        if self.class != other.class {
            levels.push(Level::Class);
        }
        if self.subject != other.subject {
            levels.push(Level::Subject);
        }
        if self.child != other.child || self.viewing_as_child != other.viewing_as_child {
            levels.push(Level::Child);
        }
        levels
    }
}

/// One tier of the selection hierarchy (or the parallel child tier).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Organization,
    Class,
    Subject,
    Child,
}

/// Published once per changed level of a committed write. Levels changed by the same write
/// share a revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    pub level: Level,
    pub revision: u64,
}

pub struct SelectionStore {
    state: RwLock<Selection>,
    revision: AtomicU64,
    changes: broadcast::Sender<SelectionChange>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        SelectionStore {
            state: RwLock::new(Selection::default()),
            revision: AtomicU64::new(0),
            changes,
        }
    }

    pub fn snapshot(&self) -> Selection {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of committed writes that changed anything.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionChange> {
        self.changes.subscribe()
    }

    /// A different institute (or none) clears class and subject. The same institute id only
    /// refreshes its fields.
    pub fn set_organization(&self, organization: Option<Organization>) -> bool {
        self.update(|s| {
            let same_id = match (&s.organization, &organization) {
                (Some(current), Some(next)) => current.id == next.id,
                _ => false,
            };
            if !same_id {
                s.class = None;
                s.subject = None;
            }
            s.organization = organization;
        })
    }

    /// A different class (or none) clears the subject. Rejected while no institute is selected.
    pub fn set_class(&self, class: Option<ClassInfo>) -> bool {
        self.update(|s| {
            if class.is_some() && s.organization.is_none() {
                tracing::warn!("ignoring class selection without an institute");
                return;
            }
            let same_id = match (&s.class, &class) {
                (Some(current), Some(next)) => current.id == next.id,
                _ => false,
            };
            if !same_id {
                s.subject = None;
            }
            s.class = class;
        })
    }

    /// Rejected while no class is selected.
    pub fn set_subject(&self, subject: Option<Subject>) -> bool {
        self.update(|s| {
            if subject.is_some() && s.class.is_none() {
                tracing::warn!("ignoring subject selection without a class");
                return;
            }
            s.subject = subject;
        })
    }

    /// Never touches institute/class/subject. Viewing-as-child is forced off without a child.
    pub fn set_child(&self, child: Option<Child>, viewing_as_child: bool) -> bool {
        self.update(|s| {
            s.viewing_as_child = viewing_as_child && child.is_some();
            s.child = child;
        })
    }

    /// Back to all-empty, as at session end.
    pub fn reset(&self) -> bool {
        self.update(|s| *s = Selection::default())
    }

    /// Apply `mutate` under one write lock; publish the changed levels if anything changed.
    fn update(&self, mutate: impl FnOnce(&mut Selection)) -> bool {
        let (levels, revision) = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let before = guard.clone();
            mutate(&mut *guard);
            debug_assert!(guard.holds_invariants());
            let levels = before.changed_levels(&*guard);
            if levels.is_empty() {
                return false;
            }
            (levels, self.revision.fetch_add(1, Ordering::SeqCst) + 1)
        };
        for level in levels {
            // No subscribers is fine.
            let _ = self.changes.send(SelectionChange { level, revision });
        }
        true
    }
}
