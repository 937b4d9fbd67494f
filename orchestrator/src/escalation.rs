//! Passive escalation detection (spec §4.7): after a fast-tier pass
//! completes normally with no explicit `escalate` signal, a pure check
//! over what that pass actually produced decides whether the turn
//! should still escalate to the structural tier.

use aide_reducer::Operation;
use aide_snapshot::{Display, Snapshot, ROOT};

use crate::turn::EscalateTarget;
use aide_classify::Tier;

const ESCALATION_PHRASES: &[&str] = &["needs a new section", "needs structural", "escalat"];

/// Does this pass's output warrant a passive escalation to structural?
/// Only ever called for a fast-tier pass that completed with
/// `escalate_target` still unset (spec §4.7: explicit signals always
/// take precedence over passive detection).
pub fn detect_passive_escalation(
    pass_ops: &[Operation],
    voice_texts: &[String],
    snapshot_after_pass: &Snapshot,
) -> Option<EscalateTarget> {
    let root_id = snapshot_after_pass.root_entity().map(|e| e.id.0.as_str());

    for op in pass_ops {
        if let Operation::EntityCreate { parent, display, .. } = op {
            if is_structural_display(display) && is_depth_one(parent, root_id) {
                return Some(EscalateTarget {
                    tier: Tier::Structural,
                    reason: "structural_signal".to_string(),
                    extract: None,
                });
            }
        }
    }

    for text in voice_texts {
        if contains_escalation_phrase(text) {
            return Some(EscalateTarget {
                tier: Tier::Structural,
                reason: "structural_signal".to_string(),
                extract: None,
            });
        }
    }

    None
}

fn is_structural_display(display: &Option<Display>) -> bool {
    matches!(
        display,
        Some(Display::Page)
            | Some(Display::Section)
            | Some(Display::Table)
            | Some(Display::List)
            | Some(Display::Checklist)
    )
}

fn is_depth_one(parent: &str, root_id: Option<&str>) -> bool {
    parent == ROOT || root_id.is_some_and(|r| r == parent)
}

fn contains_escalation_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    ESCALATION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn create(id: &str, parent: &str, display: Option<Display>) -> Operation {
        Operation::EntityCreate {
            id: id.to_string(),
            parent: parent.to_string(),
            display,
            props: Map::new(),
        }
    }

    #[test]
    fn top_level_section_escalates() {
        let snapshot = Snapshot::empty();
        let ops = vec![create("sec1", ROOT, Some(Display::Section))];
        let target = detect_passive_escalation(&ops, &[], &snapshot);
        assert_eq!(target.unwrap().reason, "structural_signal");
    }

    #[test]
    fn nested_section_does_not_escalate() {
        let snapshot = Snapshot::empty();
        let ops = vec![create("sub1", "some_card", Some(Display::Section))];
        assert!(detect_passive_escalation(&ops, &[], &snapshot).is_none());
    }

    #[test]
    fn voice_phrase_escalates() {
        let snapshot = Snapshot::empty();
        let texts = vec!["This page needs structural changes.".to_string()];
        assert!(detect_passive_escalation(&[], &texts, &snapshot).is_some());
    }

    #[test]
    fn plain_update_does_not_escalate() {
        let snapshot = Snapshot::empty();
        let texts = vec!["Updated the RSVP.".to_string()];
        assert!(detect_passive_escalation(&[], &texts, &snapshot).is_none());
    }
}
