//! Research queue scheduler
//!
//! One `update` per tick, in a fixed order:
//! 1. seeding and the defensive fast-track (early turns only)
//! 2. the cheapest-first top-up (after seeding, and every late turn)
//! 3. acceleration rules, in table order
//! 4. prune rules
//!
//! The scheduler only edits its local copy of the queue; the planner issues
//! the resulting commands to the game.

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::QueueConfig;
use crate::core::error::TickWarning;
use crate::priority::PriorityState;
use crate::research::acceleration::accelerate;
use crate::research::catalog::TechCatalog;
use crate::research::pruning::prune;
use crate::research::queue::{QueueCommand, QueueEditor, ResearchQueue};
use crate::research::seeding::{fast_track_defense, seed, should_seed, should_top_up, top_up};
use crate::snapshot::WorldSnapshot;

/// Everything one scheduler pass produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleOutcome {
    pub commands: Vec<QueueCommand>,
    pub warnings: Vec<TickWarning>,
    /// Acceleration and prune rules that changed the queue
    pub fired_rules: Vec<String>,
    pub seeded: bool,
}

#[derive(Debug, Clone)]
pub struct QueueScheduler {
    config: QueueConfig,
    research_index: usize,
}

impl QueueScheduler {
    pub fn new(config: QueueConfig, research_index: usize) -> Self {
        Self { config, research_index }
    }

    pub fn research_index(&self) -> usize {
        self.research_index
    }

    pub fn update(
        &self,
        snapshot: &WorldSnapshot,
        queue: &mut ResearchQueue,
        catalog: &TechCatalog,
        priorities: &PriorityState,
    ) -> ScheduleOutcome {
        let config = &self.config;
        let seeded = should_seed(snapshot, queue, config);
        let mut editor = QueueEditor::new(queue, catalog, snapshot);

        if seeded {
            match config.seed_lists.get(self.research_index) {
                Some(list) => {
                    seed(&mut editor, list);
                }
                None => editor.warn(TickWarning::missing(format!(
                    "seed list {}",
                    self.research_index
                ))),
            }
            fast_track_defense(&mut editor, config);
        }
        if seeded || should_top_up(snapshot, config) {
            top_up(&mut editor, &config.excluded_techs);
        }

        let mut fired_rules = accelerate(
            &mut editor,
            &config.rules,
            priorities,
            config.accelerate_floor,
            config.turns_left_horizon,
        );
        fired_rules.extend(prune(&mut editor, &config.prune_rules));

        let (commands, warnings) = editor.finish();
        if commands.iter().any(|c| !c.is_order()) {
            warn!(
                turn = snapshot.turn,
                skipped = commands.iter().filter(|c| !c.is_order()).count(),
                "some queue placements were skipped"
            );
        }
        debug!(
            turn = snapshot.turn,
            seeded,
            orders = commands.iter().filter(|c| c.is_order()).count(),
            queue_len = queue.len(),
            "research queue scheduled"
        );

        ScheduleOutcome {
            commands,
            warnings,
            fired_rules,
            seeded,
        }
    }
}
