//! Route vocabulary and defaults for the synchronizer.

use serde::{Deserialize, Serialize};

/// Route segment names, fallback routes, and resource paths. Keys are snake_case in JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// First segment of institute-scoped routes (`/institute/{id}/...`).
    pub organization_segment: String,
    /// First segment of child-scoped routes (`/child/{id}/...`).
    pub child_segment: String,
    pub class_segment: String,
    pub subject_segment: String,
    /// Class-scoped parents view; never carries a subject.
    pub parents_segment: String,
    pub select_organization_segment: String,
    pub select_class_segment: String,
    pub select_subject_segment: String,
    /// Redirect target when the institute in the route cannot be resolved.
    pub organization_fallback: String,
    /// Resource path listing the session user's accessible children.
    pub children_path: String,
    /// Prefix of the synthetic name on a provisional class ("Class 42").
    pub placeholder_label: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            organization_segment: "institute".into(),
            child_segment: "child".into(),
            class_segment: "class".into(),
            subject_segment: "subject".into(),
            parents_segment: "parents".into(),
            select_organization_segment: "select-institute".into(),
            select_class_segment: "select-class".into(),
            select_subject_segment: "select-subject".into(),
            organization_fallback: "/select-institute".into(),
            children_path: "/parents/children".into(),
            placeholder_label: "Class".into(),
        }
    }
}

impl SyncConfig {
    /// Synthetic name shown on a class before its record arrives.
    pub fn placeholder_name(&self, class_id: &str) -> String {
        format!("{} {}", self.placeholder_label, class_id)
    }
}
