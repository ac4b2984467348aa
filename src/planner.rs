//! Turn planner - one empire's tick driver
//!
//! A tick is: collect snapshot -> reconcile queue -> score every domain ->
//! publish priorities -> schedule the research queue -> issue queue orders.
//!
//! The planner is the only stateful piece: it owns the local research queue
//! and last tick's priorities. Everything else is rebuilt from the snapshot.

use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::PlannerConfig;
use crate::core::error::{ConfigError, Result, TickWarning};
use crate::core::types::{Aggression, EmpireId, TechId, Tick};
use crate::game::{GameView, OrderSink};
use crate::priority::{PriorityEngine, PriorityState};
use crate::research::catalog::TechCatalog;
use crate::research::queue::{QueueCommand, ResearchQueue};
use crate::research::scheduler::QueueScheduler;
use crate::snapshot::collect;
use crate::style::{coefficients_for, research_index};

/// Result of one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub turn: Tick,
    pub empire: EmpireId,
    pub priorities: PriorityState,
    pub commands: Vec<QueueCommand>,
    pub warnings: Vec<TickWarning>,
    pub fired_rules: Vec<String>,
    /// Queue after this tick's edits
    pub queue: Vec<TechId>,
}

impl TickReport {
    /// Commands that were sent to the game
    pub fn orders(&self) -> impl Iterator<Item = &QueueCommand> {
        self.commands.iter().filter(|c| c.is_order())
    }
}

pub struct TurnPlanner {
    empire: EmpireId,
    catalog: TechCatalog,
    engine: PriorityEngine,
    scheduler: QueueScheduler,
    queue: ResearchQueue,
    priorities: PriorityState,
}

impl TurnPlanner {
    /// Build a planner for one empire. Any config problem is fatal here,
    /// before the first tick.
    pub fn new(
        config: PlannerConfig,
        catalog: TechCatalog,
        empire: EmpireId,
        aggression: Aggression,
    ) -> Result<Self> {
        config.validate()?;
        let coefficients = coefficients_for(&config, empire, aggression)?;
        let research_index = research_index(empire, aggression);
        if research_index >= config.queue.seed_lists.len() {
            return Err(ConfigError::StyleIndexOutOfRange {
                index: research_index,
                available: config.queue.seed_lists.len(),
            });
        }

        info!(
            empire = %empire,
            %aggression,
            style = coefficients.style_index,
            research_index,
            techs = catalog.len(),
            "planner ready"
        );

        let scheduler = QueueScheduler::new(config.queue.clone(), research_index);
        Ok(Self {
            empire,
            catalog,
            engine: PriorityEngine::new(config, coefficients),
            scheduler,
            queue: ResearchQueue::new(),
            priorities: PriorityState::default(),
        })
    }

    pub fn empire(&self) -> EmpireId {
        self.empire
    }

    pub fn queue(&self) -> &ResearchQueue {
        &self.queue
    }

    /// Priorities published on the last tick
    pub fn priorities(&self) -> &PriorityState {
        &self.priorities
    }

    pub fn catalog(&self) -> &TechCatalog {
        &self.catalog
    }

    /// Run one tick against the game. Never fails: every problem ends up in
    /// the report's warning list.
    pub fn run_tick<G>(&mut self, game: &mut G) -> TickReport
    where
        G: GameView + OrderSink + ?Sized,
    {
        let (snapshot, mut warnings) = collect(&*game, &self.catalog);
        self.queue.reconcile(&snapshot.research_queue);

        let (priorities, score_warnings) = self.engine.compute(&snapshot, &self.priorities);
        warnings.extend(score_warnings);
        for (domain, score) in priorities.iter() {
            game.set_priority(domain, score);
        }
        self.priorities = priorities;

        let outcome = self
            .scheduler
            .update(&snapshot, &mut self.queue, &self.catalog, &priorities);
        warnings.extend(outcome.warnings);

        for command in &outcome.commands {
            let result = match command {
                QueueCommand::Enqueue { tech, index } => game.enqueue_tech(tech, Some(*index)),
                QueueCommand::Dequeue { tech } => game.dequeue_tech(tech),
                QueueCommand::Skipped { .. } => continue,
            };
            if let Err(e) = result {
                let warning = TickWarning::InvalidOperation {
                    command: command.to_string(),
                    reason: e.to_string(),
                };
                warn!(turn = snapshot.turn, empire = %self.empire, "{}", warning);
                warnings.push(warning);
            }
        }

        let orders = outcome.commands.iter().filter(|c| c.is_order()).count();
        info!(
            turn = snapshot.turn,
            empire = %self.empire,
            orders,
            warnings = warnings.len(),
            queue_len = self.queue.len(),
            rules = ?outcome.fired_rules,
            "tick complete"
        );

        TickReport {
            turn: snapshot.turn,
            empire: self.empire,
            priorities,
            commands: outcome.commands,
            warnings,
            fired_rules: outcome.fired_rules,
            queue: self.queue.techs().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CommandError;
    use crate::game::SandboxEmpire;
    use crate::priority::Domain;
    use crate::research::catalog::TechDefinition;

    fn catalog() -> TechCatalog {
        TechCatalog::from_definitions(vec![
            TechDefinition::new("LRN_ALGO_ELEGANCE", 10.0, &[]),
            TechDefinition::new("GRO_PLANET_ECOL", 10.0, &[]),
            TechDefinition::new("GRO_GENETIC_ENG", 9.0, &[]),
            TechDefinition::new("LRN_PHYS_BRAIN", 12.0, &["LRN_ALGO_ELEGANCE"]),
        ])
        .unwrap()
    }

    fn config() -> PlannerConfig {
        let mut config = PlannerConfig::default();
        let list: Vec<TechId> = ["LRN_PHYS_BRAIN", "GRO_PLANET_ECOL"]
            .iter()
            .map(|t| TechId::from(*t))
            .collect();
        config.queue.seed_lists = vec![list; 5];
        config.queue.rules.clear();
        config.queue.prune_rules.clear();
        config
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = config();
        config.styles.research_settings.pop();
        let result = TurnPlanner::new(config, catalog(), EmpireId(0), Aggression::Typical);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_seed_table_is_fatal() {
        let mut config = config();
        config.queue.seed_lists.truncate(1);
        let result = TurnPlanner::new(config, catalog(), EmpireId(3), Aggression::Aggressive);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_tick_publishes_priorities_and_seeds() {
        let mut planner = TurnPlanner::new(config(), catalog(), EmpireId(0), Aggression::Typical).unwrap();
        let mut empire = SandboxEmpire::new(EmpireId(0), Aggression::Typical, catalog());

        let report = planner.run_tick(&mut empire);

        assert_eq!(report.turn, 1);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
        assert_eq!(empire.published.len(), Domain::COUNT);
        assert_eq!(empire.published[&Domain::Learning], 100.0);
        let queued_ids = empire.queued_techs();
        let queued: Vec<&str> = queued_ids.iter().map(|t| t.as_str()).collect();
        assert_eq!(&queued[..3], &["LRN_ALGO_ELEGANCE", "LRN_PHYS_BRAIN", "GRO_PLANET_ECOL"]);
        assert_eq!(report.queue.len(), queued.len());
    }

    #[test]
    fn test_rejected_order_becomes_warning() {
        let mut planner = TurnPlanner::new(config(), catalog(), EmpireId(0), Aggression::Typical).unwrap();
        let mut empire = SandboxEmpire::new(EmpireId(0), Aggression::Typical, catalog());
        empire.reject_orders = Some(CommandError::Rejected {
            reason: "queue locked".to_string(),
        });

        let report = planner.run_tick(&mut empire);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, TickWarning::InvalidOperation { .. })));
        assert!(empire.queued_techs().is_empty());
    }
}
