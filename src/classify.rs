//! Keyword heuristics the simulation branches on.
//!
//! All matching is case-insensitive substring matching. These are stand-ins
//! for a real classifier; each policy is a named function over a keyword
//! table so it can be tested and swapped on its own.

use crate::pod::{DeliverableKind, LaborUnit, Tool, WorkKind};

/// Markers that flag a work request as the pull-request path.
const PULL_REQUEST_MARKERS: &[&str] = &["314", "pr"];

/// Role keywords that make a unit halt for human approval on completion.
const RISK_ROLE_KEYWORDS: &[&str] = &["checker", "policy", "compliance"];

/// Role keyword that grants delegation in the exported crew config.
const MANAGER_ROLE_KEYWORDS: &[&str] = &["manager"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Classify an intake request. "pr" also matches inside ordinary words
/// ("process", "improve").
pub fn classify_work(content: &str) -> WorkKind {
    if contains_any(content, PULL_REQUEST_MARKERS) {
        WorkKind::Pr
    } else {
        WorkKind::Ticket
    }
}

pub fn is_risk_role(role: &str) -> bool {
    contains_any(role, RISK_ROLE_KEYWORDS)
}

pub fn is_manager_role(role: &str) -> bool {
    contains_any(role, MANAGER_ROLE_KEYWORDS)
}

/// Artifact type a unit emits when it finishes a task.
pub fn deliverable_kind_for(unit: &LaborUnit) -> DeliverableKind {
    if unit.has_tool(Tool::GitHub) {
        DeliverableKind::Git
    } else {
        DeliverableKind::Log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_markers_any_case() {
        assert_eq!(classify_work("PR #314 CI checks failing"), WorkKind::Pr);
        assert_eq!(classify_work("ticket 314"), WorkKind::Pr);
        assert_eq!(classify_work("review the Pr"), WorkKind::Pr);
        assert_eq!(classify_work("pR"), WorkKind::Pr);
    }

    #[test]
    fn pr_marker_matches_inside_words() {
        assert_eq!(classify_work("improve docs"), WorkKind::Pr);
    }

    #[test]
    fn other_text_is_ticket() {
        assert_eq!(classify_work("Fix login timeout"), WorkKind::Ticket);
        assert_eq!(classify_work("31 4"), WorkKind::Ticket);
    }

    #[test]
    fn risk_roles() {
        assert!(is_risk_role("Checker"));
        assert!(is_risk_role("Production POLICY Auditor"));
        assert!(is_risk_role("compliance lead"));
        assert!(!is_risk_role("Lead Architect"));
        assert!(!is_risk_role(""));
    }

    #[test]
    fn manager_roles() {
        assert!(is_manager_role("Project Manager"));
        assert!(is_manager_role("MANAGER"));
        assert!(!is_manager_role("Product Lead"));
    }

    #[test]
    fn github_units_emit_git_deliverables() {
        let mut unit = LaborUnit::recruit();
        assert_eq!(deliverable_kind_for(&unit), DeliverableKind::Log);
        unit.toggle_tool(Tool::GitHub);
        assert_eq!(deliverable_kind_for(&unit), DeliverableKind::Git);
    }
}
