//! Research queue and topologically clamped placement
//!
//! The queue holds each tech at most once. Every insertion goes through
//! `QueueEditor::place`, which clamps the requested index so a tech never
//! lands ahead of an incomplete prerequisite or behind a queued dependent.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{CatalogError, TickWarning};
use crate::core::types::TechId;
use crate::research::catalog::{TechCatalog, TechStatus};
use crate::snapshot::WorldSnapshot;

/// Turns-left value meaning "no prediction available"
pub const NO_PREDICTION: i32 = -1;

/// One research queue entry as reported by the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub tech: TechId,
    /// Research points spent on this tech per turn
    pub allocation: f64,
    pub turns_left: i32,
}

impl QueueItem {
    pub fn new(tech: TechId) -> Self {
        Self {
            tech,
            allocation: 0.0,
            turns_left: NO_PREDICTION,
        }
    }

    pub fn is_allocating(&self) -> bool {
        self.allocation > 0.0
    }
}

/// Command issued to the game for a queue change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum QueueCommand {
    Enqueue { tech: TechId, index: usize },
    Dequeue { tech: TechId },
    /// Nothing issued; kept in the command list for reporting
    Skipped { tech: TechId, reason: String },
}

impl QueueCommand {
    /// True for commands that change the queue
    pub fn is_order(&self) -> bool {
        !matches!(self, QueueCommand::Skipped { .. })
    }
}

impl fmt::Display for QueueCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueCommand::Enqueue { tech, index } => write!(f, "enqueue {tech} at {index}"),
            QueueCommand::Dequeue { tech } => write!(f, "dequeue {tech}"),
            QueueCommand::Skipped { tech, reason } => write!(f, "skip {tech} ({reason})"),
        }
    }
}

/// Ordered research queue without duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchQueue {
    items: Vec<QueueItem>,
}

impl ResearchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from observed items, keeping the first occurrence of each tech
    pub fn from_items(items: impl IntoIterator<Item = QueueItem>) -> Self {
        let mut seen = AHashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.tech.clone()))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&QueueItem> {
        self.items.last()
    }

    pub fn techs(&self) -> impl Iterator<Item = &TechId> {
        self.items.iter().map(|item| &item.tech)
    }

    pub fn position(&self, tech: &TechId) -> Option<usize> {
        self.items.iter().position(|item| &item.tech == tech)
    }

    pub fn contains(&self, tech: &TechId) -> bool {
        self.position(tech).is_some()
    }

    /// Is `tech` among the first `n` items?
    pub fn in_front(&self, tech: &TechId, n: usize) -> bool {
        self.items.iter().take(n).any(|item| &item.tech == tech)
    }

    /// Move or insert `tech` so it ends at `index` (clamped to the end).
    /// Returns the final index.
    pub fn insert_at(&mut self, tech: &TechId, index: usize) -> usize {
        let item = match self.position(tech) {
            Some(current) => self.items.remove(current),
            None => QueueItem::new(tech.clone()),
        };
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        index
    }

    /// Remove `tech`; absent techs are a silent no-op
    pub fn remove(&mut self, tech: &TechId) -> bool {
        match self.position(tech) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Adopt the game's view of the queue
    pub fn reconcile(&mut self, observed: &[QueueItem]) {
        *self = Self::from_items(observed.iter().cloned());
    }
}

/// Outcome of a single placement
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Placed(usize),
    /// Already at the clamped index; no command issued
    Unchanged(usize),
    NotPlaced,
}

impl Placement {
    pub fn index(&self) -> Option<usize> {
        match self {
            Placement::Placed(i) | Placement::Unchanged(i) => Some(*i),
            Placement::NotPlaced => None,
        }
    }
}

/// Per-tick editing context over the queue
///
/// Collects the commands and warnings produced while seeding, accelerating
/// and pruning so the scheduler can hand them to the planner in one batch.
pub struct QueueEditor<'a> {
    queue: &'a mut ResearchQueue,
    catalog: &'a TechCatalog,
    snapshot: &'a WorldSnapshot,
    commands: Vec<QueueCommand>,
    warnings: Vec<TickWarning>,
}

impl<'a> QueueEditor<'a> {
    pub fn new(
        queue: &'a mut ResearchQueue,
        catalog: &'a TechCatalog,
        snapshot: &'a WorldSnapshot,
    ) -> Self {
        Self {
            queue,
            catalog,
            snapshot,
            commands: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn queue(&self) -> &ResearchQueue {
        &*self.queue
    }

    pub fn catalog(&self) -> &TechCatalog {
        self.catalog
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        self.snapshot
    }

    pub fn commands(&self) -> &[QueueCommand] {
        &self.commands
    }

    pub fn warn(&mut self, warning: TickWarning) {
        warn!(turn = self.snapshot.turn, "{}", warning);
        self.warnings.push(warning);
    }

    fn skip(&mut self, tech: &TechId, reason: String) {
        debug!(%tech, %reason, "placement skipped");
        self.commands.push(QueueCommand::Skipped {
            tech: tech.clone(),
            reason,
        });
    }

    /// Incomplete prerequisites of `tech`, deepest first
    pub fn unmet_prerequisites(&self, tech: &TechId) -> Result<Vec<TechId>, CatalogError> {
        let snapshot = self.snapshot;
        self.catalog
            .unmet_prerequisites(tech, &|t: &TechId| snapshot.is_complete(t))
    }

    /// Does `tech` still wait on `prerequisite`?
    pub fn needs(&self, tech: &TechId, prerequisite: &TechId) -> bool {
        self.unmet_prerequisites(tech)
            .map(|unmet| unmet.contains(prerequisite))
            .unwrap_or(false)
    }

    /// Expand techs into a placement batch: each tech preceded by its
    /// incomplete recursive prerequisites, complete techs and anything in
    /// `handled` dropped, every emitted tech added to `handled`.
    pub fn expand(&mut self, techs: &[TechId], handled: &mut AHashSet<TechId>) -> Vec<TechId> {
        let mut batch = Vec::new();
        for tech in techs {
            if handled.contains(tech) || self.snapshot.is_complete(tech) {
                continue;
            }
            let prerequisites = match self.unmet_prerequisites(tech) {
                Ok(list) => list,
                Err(e) => {
                    handled.insert(tech.clone());
                    self.skip(tech, e.to_string());
                    self.warn(TickWarning::Catalog(e));
                    continue;
                }
            };
            for prerequisite in prerequisites {
                if handled.insert(prerequisite.clone()) {
                    batch.push(prerequisite);
                }
            }
            handled.insert(tech.clone());
            batch.push(tech.clone());
        }
        batch
    }

    /// Place `tech` as close to `desired` as the prerequisite order allows
    pub fn place(&mut self, tech: &TechId, desired: usize) -> Placement {
        match self.snapshot.tech_status(tech) {
            TechStatus::Complete => return Placement::NotPlaced,
            TechStatus::Unresearchable => {
                self.skip(tech, "unresearchable".to_string());
                return Placement::NotPlaced;
            }
            TechStatus::Researchable => {}
        }

        let prerequisites = match self.unmet_prerequisites(tech) {
            Ok(list) => list,
            Err(e) => {
                self.skip(tech, e.to_string());
                self.warn(TickWarning::Catalog(e));
                return Placement::NotPlaced;
            }
        };

        // Positions are computed as if `tech` were already taken out
        let current = self.queue.position(tech);
        let rest: Vec<TechId> = self.queue.techs().filter(|t| *t != tech).cloned().collect();

        let mut lower = 0;
        for prerequisite in &prerequisites {
            match self.snapshot.tech_status(prerequisite) {
                TechStatus::Complete => continue,
                TechStatus::Unresearchable => {
                    self.skip(tech, format!("prerequisite {prerequisite} is unresearchable"));
                    return Placement::NotPlaced;
                }
                TechStatus::Researchable => {}
            }
            match rest.iter().position(|t| t == prerequisite) {
                Some(i) => lower = lower.max(i + 1),
                None => {
                    self.skip(tech, format!("prerequisite {prerequisite} is not queued"));
                    self.warn(TickWarning::Deferred {
                        tech: tech.clone(),
                        missing: prerequisite.clone(),
                    });
                    return Placement::NotPlaced;
                }
            }
        }

        let upper = rest
            .iter()
            .position(|t| self.needs(t, tech))
            .unwrap_or(rest.len())
            .max(lower);

        let index = desired.clamp(lower, upper);
        if current == Some(index) {
            return Placement::Unchanged(index);
        }

        let index = self.queue.insert_at(tech, index);
        debug!(%tech, index, "enqueue");
        self.commands.push(QueueCommand::Enqueue {
            tech: tech.clone(),
            index,
        });
        Placement::Placed(index)
    }

    /// Place at the end of the queue
    pub fn append(&mut self, tech: &TechId) -> Placement {
        let end = self.queue.len();
        self.place(tech, end)
    }

    /// Remove `tech` if queued
    pub fn dequeue(&mut self, tech: &TechId) -> bool {
        if !self.queue.remove(tech) {
            return false;
        }
        debug!(%tech, "dequeue");
        self.commands.push(QueueCommand::Dequeue { tech: tech.clone() });
        true
    }

    pub fn finish(self) -> (Vec<QueueCommand>, Vec<TickWarning>) {
        (self.commands, self.warnings)
    }
}
