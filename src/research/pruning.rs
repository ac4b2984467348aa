//! Prune rules: the only way a tech leaves the queue unresearched
//!
//! Typical case: a trigger tech arrived early (e.g. from ruins), leaving its
//! prerequisite chain in the queue with nothing left to unlock.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::TickWarning;
use crate::core::types::TechId;
use crate::research::queue::QueueEditor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruneRule {
    pub name: String,
    /// Rule only runs once this tech is complete
    pub trigger: TechId,
    /// Lingering prerequisites kept at the front
    pub keep: usize,
    #[serde(default)]
    pub follow_up: Option<FollowUp>,
}

/// Tech moved forward after a prune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub tech: TechId,
    pub back_off: usize,
}

/// Apply every prune rule. Returns the names of the rules that removed
/// something.
pub fn prune(editor: &mut QueueEditor, rules: &[PruneRule]) -> Vec<String> {
    let mut fired = Vec::new();

    for rule in rules {
        if !editor.snapshot().is_complete(&rule.trigger) {
            continue;
        }
        let catalog = editor.catalog();
        let prerequisites: AHashSet<TechId> = match catalog.recursive_prerequisites(&rule.trigger) {
            Ok(list) => list.iter().cloned().collect(),
            Err(e) => {
                editor.warn(TickWarning::Catalog(e));
                continue;
            }
        };

        let lingering: Vec<TechId> = editor
            .queue()
            .techs()
            .filter(|t| prerequisites.contains(*t))
            .cloned()
            .collect();
        if lingering.len() <= rule.keep {
            continue;
        }

        let mut removed = 0;
        for candidate in lingering[rule.keep..].iter().rev() {
            let still_needed = editor
                .queue()
                .techs()
                .any(|t| t != candidate && editor.needs(t, candidate));
            if !still_needed && editor.dequeue(candidate) {
                removed += 1;
            }
        }
        if removed == 0 {
            continue;
        }

        info!(rule = %rule.name, removed, "pruned lingering prerequisites");
        if let Some(follow_up) = &rule.follow_up {
            if let Some(index) = editor.queue().position(&follow_up.tech) {
                editor.place(&follow_up.tech, index.saturating_sub(follow_up.back_off));
            }
        }
        fired.push(rule.name.clone());
    }

    fired
}
