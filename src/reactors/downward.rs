//! Downward clearing: the route decides which selection levels may exist. Runs on route changes
//! only, never on selection changes, and never redirects.

use crate::routes::{RouteBranch, RouteSnapshot, SelectionStep};
use crate::store::{Level, SelectionStore};

/// Clear every level the route does not permit. Returns the levels that changed.
pub fn clear_for_route(route: &RouteSnapshot, store: &SelectionStore) -> Vec<Level> {
    let before = store.snapshot();

    if route.branch != RouteBranch::Child && before.viewing_as_child && before.child.is_some() {
        store.set_child(None, false);
    }

    match route.branch {
        RouteBranch::Child => match route.step {
            Some(SelectionStep::Organization) => {
                store.set_organization(None);
                clear_class(store);
            }
            Some(SelectionStep::Class) => clear_class(store),
            Some(SelectionStep::Subject) => clear_subject(store),
            None => {}
        },
        RouteBranch::Other => {
            if before.organization.is_some() {
                store.set_organization(None);
            }
            // Repair lingering levels even when the institute is already gone.
            clear_class(store);
        }
        RouteBranch::Organization => match route.step {
            Some(SelectionStep::Class) => clear_class(store),
            Some(SelectionStep::Subject) => clear_subject(store),
            _ => {
                if route.class_id.is_none() {
                    clear_class(store);
                }
                if route.subject_id.is_none() {
                    clear_subject(store);
                }
            }
        },
    }

    let cleared = before.changed_levels(&store.snapshot());
    if !cleared.is_empty() {
        tracing::debug!(path = %route.path, cleared = ?cleared, "cleared selection levels for route");
    }
    cleared
}

/// Class and subject.
fn clear_class(store: &SelectionStore) {
    store.set_class(None);
    store.set_subject(None);
}

fn clear_subject(store: &SelectionStore) {
    store.set_subject(None);
}
