//! Route and resource path builders, plus context-aware "back" navigation.

use crate::config::SyncConfig;
use crate::store::Selection;
use urlencoding::encode;

/// `/select-institute` (or the configured fallback).
pub fn select_organization(config: &SyncConfig) -> String {
    config.organization_fallback.clone()
}

/// `/institute/{id}/select-class`
pub fn organization_select_class(config: &SyncConfig, organization_id: &str) -> String {
    format!(
        "/{}/{}/{}",
        config.organization_segment,
        encode(organization_id),
        config.select_class_segment
    )
}

/// `/institute/{id}/class/{id}/select-subject`
pub fn organization_select_subject(config: &SyncConfig, organization_id: &str, class_id: &str) -> String {
    format!(
        "/{}/{}/{}/{}/{}",
        config.organization_segment,
        encode(organization_id),
        config.class_segment,
        encode(class_id),
        config.select_subject_segment
    )
}

pub fn child_select_organization(config: &SyncConfig, child_id: &str) -> String {
    child_step(config, child_id, &config.select_organization_segment)
}

pub fn child_select_class(config: &SyncConfig, child_id: &str) -> String {
    child_step(config, child_id, &config.select_class_segment)
}

pub fn child_select_subject(config: &SyncConfig, child_id: &str) -> String {
    child_step(config, child_id, &config.select_subject_segment)
}

fn child_step(config: &SyncConfig, child_id: &str, step: &str) -> String {
    format!("/{}/{}/{}", config.child_segment, encode(child_id), step)
}

/// Resource path of one class: `/institutes/{id}/classes/{id}`.
pub fn class_resource(organization_id: &str, class_id: &str) -> String {
    format!("/institutes/{}/classes/{}", encode(organization_id), encode(class_id))
}

/// Resource path of one subject: `/classes/{id}/subjects/{id}`.
pub fn subject_resource(class_id: &str, subject_id: &str) -> String {
    format!("/classes/{}/subjects/{}", encode(class_id), encode(subject_id))
}

/// Where a context "back" action leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackTarget {
    Route(String),
    /// Nothing selected; defer to browser history.
    History,
}

/// One level up from the deepest selected level of the institute branch.
pub fn back_target(selection: &Selection, config: &SyncConfig) -> BackTarget {
    match (selection.organization_id(), selection.class_id(), selection.subject_id()) {
        (Some(org), Some(class), Some(_)) => {
            BackTarget::Route(organization_select_subject(config, org.as_str(), class.as_str()))
        }
        (Some(org), Some(_), None) => BackTarget::Route(organization_select_class(config, org.as_str())),
        (Some(_), None, _) => BackTarget::Route(select_organization(config)),
        _ => BackTarget::History,
    }
}

pub fn back_label(selection: &Selection) -> &'static str {
    if selection.subject.is_some() && selection.class.is_some() {
        "Back to Subject Selection"
    } else if selection.class.is_some() {
        "Back to Class Selection"
    } else if selection.organization.is_some() {
        "Back to Institute Selection"
    } else {
        "Back"
    }
}
