//! Route observation: decode the selection identifiers carried by the current location.
//! Pure and uncached; recomputed on every navigation.

use crate::config::SyncConfig;
use crate::navigation::Location;

/// Which selection branch the route is rooted in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteBranch {
    /// `/child/{id}/...`: a guardian browsing as a dependent.
    Child,
    /// `/institute/{id}/...`
    Organization,
    #[default]
    Other,
}

/// Selection-step screens (`select-institute`, `select-class`, `select-subject`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionStep {
    Organization,
    Class,
    Subject,
}

/// Raw identifier tokens from the route, not yet validated against any entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RouteIdentifiers {
    pub organization_id: Option<String>,
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub child_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteSnapshot {
    pub path: String,
    pub query: String,
    pub branch: RouteBranch,
    pub step: Option<SelectionStep>,
    /// Class-scoped parents view.
    pub parents_view: bool,
    pub organization_id: Option<String>,
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub child_id: Option<String>,
}

impl RouteSnapshot {
    pub fn observe(location: &Location, config: &SyncConfig) -> Self {
        let segments: Vec<String> = raw_segments(&location.path).map(decode_segment).collect();
        let is = |i: usize, name: &str| segments.get(i).map(|s| s == name).unwrap_or(false);
        let has = |name: &str| segments.iter().any(|s| s == name);

        let branch = if is(0, config.child_segment.as_str()) {
            RouteBranch::Child
        } else if is(0, config.organization_segment.as_str()) {
            RouteBranch::Organization
        } else {
            RouteBranch::Other
        };

        let step = if has(config.select_organization_segment.as_str()) {
            Some(SelectionStep::Organization)
        } else if has(config.select_class_segment.as_str()) {
            Some(SelectionStep::Class)
        } else if has(config.select_subject_segment.as_str()) {
            Some(SelectionStep::Subject)
        } else {
            None
        };

        let root_id = segments.get(1).filter(|s| !is_step(config, s)).cloned();

        let mut snapshot = RouteSnapshot {
            path: location.path.clone(),
            query: location.query.clone(),
            branch,
            step,
            parents_view: has(config.parents_segment.as_str()),
            ..RouteSnapshot::default()
        };
        match branch {
            RouteBranch::Child => snapshot.child_id = root_id,
            RouteBranch::Organization => snapshot.organization_id = root_id,
            RouteBranch::Other => return snapshot,
        }

        let (class_at, subject_at) = keyed_pairs(&segments, config);
        snapshot.class_id = class_at.map(|i| segments[i + 1].clone());
        snapshot.subject_id = subject_at.map(|i| segments[i + 1].clone());
        snapshot
    }

    pub fn identifiers(&self) -> RouteIdentifiers {
        RouteIdentifiers {
            organization_id: self.organization_id.clone(),
            class_id: self.class_id.clone(),
            subject_id: self.subject_id.clone(),
            child_id: self.child_id.clone(),
        }
    }

    /// Path with the `subject/{id}` pair removed, or `None` when it carries no subject. The pair
    /// is the one `observe` reads the subject from.
    pub fn without_subject(&self, config: &SyncConfig) -> Option<String> {
        if self.branch == RouteBranch::Other {
            return None;
        }
        let raw: Vec<&str> = raw_segments(&self.path).collect();
        let segments: Vec<String> = raw.iter().map(|s| decode_segment(s)).collect();
        let at = keyed_pairs(&segments, config).1?;
        let kept: Vec<&str> = raw
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != at && *i != at + 1)
            .map(|(_, s)| *s)
            .collect();
        Some(format!("/{}", kept.join("/")))
    }
}

fn raw_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Percent-decode one segment; malformed encodings are kept verbatim.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn is_step(config: &SyncConfig, segment: &str) -> bool {
    segment == config.select_organization_segment
        || segment == config.select_class_segment
        || segment == config.select_subject_segment
}

/// Keyword indices of the `class/{id}` and `subject/{id}` pairs below the root pair. The subject
/// is only looked for after the class pair.
fn keyed_pairs(segments: &[String], config: &SyncConfig) -> (Option<usize>, Option<usize>) {
    let class_at = find_keyed(segments, &config.class_segment, 2, config);
    let subject_from = class_at.map(|i| i + 2).unwrap_or(2);
    (class_at, find_keyed(segments, &config.subject_segment, subject_from, config))
}

/// Index of the first `keyword` at or after `from` that is followed by an id segment.
fn find_keyed(segments: &[String], keyword: &str, from: usize, config: &SyncConfig) -> Option<usize> {
    (from..segments.len().saturating_sub(1))
        .find(|&i| segments[i] == keyword)
        .filter(|&i| !is_step(config, &segments[i + 1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(href: &str) -> RouteSnapshot {
        RouteSnapshot::observe(&Location::parse(href), &SyncConfig::default())
    }

    #[test]
    fn full_organization_route() {
        let r = observe("/institute/ORG1/class/C1/subject/S1/homework");
        assert_eq!(r.branch, RouteBranch::Organization);
        assert_eq!(r.step, None);
        assert_eq!(r.organization_id.as_deref(), Some("ORG1"));
        assert_eq!(r.class_id.as_deref(), Some("C1"));
        assert_eq!(r.subject_id.as_deref(), Some("S1"));
        assert_eq!(r.child_id, None);
    }

    #[test]
    fn selection_steps() {
        assert_eq!(observe("/institute/ORG1/select-class").step, Some(SelectionStep::Class));
        let r = observe("/institute/ORG1/class/C1/select-subject");
        assert_eq!(r.step, Some(SelectionStep::Subject));
        assert_eq!(r.class_id.as_deref(), Some("C1"));
        assert_eq!(observe("/child/CH1/select-institute").step, Some(SelectionStep::Organization));
        assert_eq!(observe("/select-institute").branch, RouteBranch::Other);
    }

    #[test]
    fn child_route() {
        let r = observe("/child/CH1/select-subject");
        assert_eq!(r.branch, RouteBranch::Child);
        assert_eq!(r.child_id.as_deref(), Some("CH1"));
        assert_eq!(r.organization_id, None);
    }

    #[test]
    fn decodes_segments() {
        let r = observe("/institute/North%20Campus/class/7%2FA");
        assert_eq!(r.organization_id.as_deref(), Some("North Campus"));
        assert_eq!(r.class_id.as_deref(), Some("7/A"));
    }

    #[test]
    fn other_routes_carry_no_identifiers() {
        let r = observe("/dashboard/class/C1");
        assert_eq!(r.branch, RouteBranch::Other);
        assert_eq!(r.identifiers(), RouteIdentifiers::default());
    }

    #[test]
    fn parents_view_strips_subject() {
        let r = observe("/institute/ORG2/class/C1/parents/subject/S1?tab=all");
        assert!(r.parents_view);
        assert_eq!(r.subject_id.as_deref(), Some("S1"));
        assert_eq!(r.query, "tab=all");
        assert_eq!(
            r.without_subject(&SyncConfig::default()).as_deref(),
            Some("/institute/ORG2/class/C1/parents")
        );
        assert_eq!(observe("/institute/ORG2/class/C1/parents").without_subject(&SyncConfig::default()), None);
    }

    #[test]
    fn strips_the_pair_the_subject_was_read_from() {
        let config = SyncConfig::default();
        let r = observe("/institute/subject/class/C1/parents/subject/S1");
        assert_eq!(r.organization_id.as_deref(), Some("subject"));
        assert_eq!(r.subject_id.as_deref(), Some("S1"));
        assert_eq!(
            r.without_subject(&config).as_deref(),
            Some("/institute/subject/class/C1/parents")
        );

        let r = observe("/institute/O1/class/subject/parents/subject/S2");
        assert_eq!(r.class_id.as_deref(), Some("subject"));
        assert_eq!(
            r.without_subject(&config).as_deref(),
            Some("/institute/O1/class/subject/parents")
        );
        assert_eq!(observe("/dashboard/subject/S1").without_subject(&config), None);
    }
}
