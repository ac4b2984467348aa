//! Priority score engine
//!
//! Turns one `WorldSnapshot` into a demand score per `Domain`.
//!
//! Scores are computed in `Domain::ALL` order into a scratch state; later
//! domains may read earlier ones (research scales against production, the
//! category gates read the production domains). The finished state is only
//! published once every domain has a value, so callers never observe a
//! partially computed tick.

pub mod categories;
pub mod expansion;
pub mod invasion;
pub mod military;
pub mod resources;

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::config::PlannerConfig;
use crate::core::error::TickWarning;
use crate::snapshot::WorldSnapshot;
use crate::style::CoefficientTable;

/// Competing allocation domains
///
/// Declaration order is the evaluation order and the tie-break order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Production,
    Research,
    Exploration,
    Colonization,
    Outpost,
    Invasion,
    Military,
    Learning,
    Growth,
    ProductionTech,
    Construction,
    Ships,
}

impl Domain {
    pub const COUNT: usize = 12;

    pub const ALL: [Domain; Domain::COUNT] = [
        Domain::Production,
        Domain::Research,
        Domain::Exploration,
        Domain::Colonization,
        Domain::Outpost,
        Domain::Invasion,
        Domain::Military,
        Domain::Learning,
        Domain::Growth,
        Domain::ProductionTech,
        Domain::Construction,
        Domain::Ships,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Non-negative score for every domain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "BTreeMap<Domain, f64>", from = "BTreeMap<Domain, f64>")]
pub struct PriorityState {
    scores: [f64; Domain::COUNT],
}

impl PriorityState {
    pub fn get(&self, domain: Domain) -> f64 {
        self.scores[domain.index()]
    }

    fn set(&mut self, domain: Domain, score: f64) {
        self.scores[domain.index()] = score;
    }

    /// Scores in domain order
    pub fn iter(&self) -> impl Iterator<Item = (Domain, f64)> + '_ {
        Domain::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    /// Highest-scoring domain among `candidates`; ties go to the earlier
    /// domain in declaration order
    pub fn top_of(&self, candidates: &[Domain]) -> Option<Domain> {
        let mut ranked: Vec<Domain> = candidates.to_vec();
        ranked.sort_by_key(|d| d.index());
        // Stable sort keeps domain order among equal scores
        ranked.sort_by(|a, b| self.get(*b).total_cmp(&self.get(*a)));
        ranked.first().copied()
    }
}

impl From<PriorityState> for BTreeMap<Domain, f64> {
    fn from(state: PriorityState) -> Self {
        state.iter().collect()
    }
}

impl From<BTreeMap<Domain, f64>> for PriorityState {
    fn from(map: BTreeMap<Domain, f64>) -> Self {
        let mut state = PriorityState::default();
        for (domain, score) in map {
            state.set(domain, score);
        }
        state
    }
}

/// Derived values shared by several scoring functions within one tick
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub config: &'a PlannerConfig,
    pub coefficients: &'a CoefficientTable,
    /// Last tick's published priorities
    pub prior: &'a PriorityState,
    /// Colony targets the empire can afford to pursue this tick
    pub allotted_colony_targets: usize,
    /// Colony count above the growth barrier
    pub over_growth_barrier: bool,
    /// Invasion targets considered this tick (before score filtering)
    pub allotted_invasion_targets: usize,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        snapshot: &'a WorldSnapshot,
        config: &'a PlannerConfig,
        coefficients: &'a CoefficientTable,
        prior: &'a PriorityState,
    ) -> Self {
        Self {
            snapshot,
            config,
            coefficients,
            prior,
            allotted_colony_targets: expansion::allotted_colony_targets(snapshot, config, prior),
            over_growth_barrier: expansion::over_growth_barrier(snapshot, config),
            allotted_invasion_targets: invasion::allotted_targets(snapshot, config),
        }
    }
}

/// Score engine; owns the run's coefficient tables
#[derive(Debug, Clone)]
pub struct PriorityEngine {
    config: PlannerConfig,
    coefficients: CoefficientTable,
}

impl PriorityEngine {
    pub fn new(config: PlannerConfig, coefficients: CoefficientTable) -> Self {
        Self {
            config,
            coefficients,
        }
    }

    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }

    /// Score every domain for this tick
    pub fn compute(
        &self,
        snapshot: &WorldSnapshot,
        prior: &PriorityState,
    ) -> (PriorityState, Vec<TickWarning>) {
        let ctx = ScoringContext::new(snapshot, &self.config, &self.coefficients, prior);
        let mut warnings = Vec::new();
        let mut scratch = PriorityState::default();

        for domain in Domain::ALL {
            let raw = score(domain, &ctx, &scratch);
            let value = if raw.is_finite() {
                raw.max(0.0)
            } else {
                let warning = TickWarning::missing(format!("{domain} score was not a number"));
                warn!(turn = snapshot.turn, "{}", warning);
                warnings.push(warning);
                0.0
            };
            debug!(turn = snapshot.turn, %domain, score = value, "priority");
            scratch.set(domain, value);
        }

        (scratch, warnings)
    }
}

/// Scoring dispatch, one function per domain
fn score(domain: Domain, ctx: &ScoringContext, scratch: &PriorityState) -> f64 {
    match domain {
        Domain::Production => resources::production(ctx),
        Domain::Research => resources::research(ctx, scratch.get(Domain::Production)),
        Domain::Exploration => expansion::exploration(ctx),
        Domain::Colonization => expansion::colonization(ctx),
        Domain::Outpost => expansion::outpost(ctx),
        Domain::Invasion => invasion::invasion(ctx),
        Domain::Military => military::military(ctx),
        Domain::Learning => categories::learning(ctx),
        Domain::Growth | Domain::ProductionTech | Domain::Construction | Domain::Ships => {
            categories::gated(domain, ctx, scratch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Aggression, EmpireId};
    use crate::style::coefficients_for;

    #[test]
    fn test_domain_order_is_index_order() {
        for (i, domain) in Domain::ALL.iter().enumerate() {
            assert_eq!(domain.index(), i);
        }
    }

    #[test]
    fn test_top_of_breaks_ties_by_domain_order() {
        let mut state = PriorityState::default();
        state.set(Domain::Outpost, 50.0);
        state.set(Domain::Military, 50.0);
        state.set(Domain::Exploration, 10.0);
        let candidates = [Domain::Military, Domain::Exploration, Domain::Outpost];
        assert_eq!(state.top_of(&candidates), Some(Domain::Outpost));
    }

    #[test]
    fn test_state_serializes_as_map() {
        let mut state = PriorityState::default();
        state.set(Domain::Production, 50.0);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["production"], 50.0);
        assert_eq!(json.as_object().unwrap().len(), Domain::COUNT);
    }

    #[test]
    fn test_compute_is_total_and_deterministic() {
        let config = PlannerConfig::default();
        let coefficients = coefficients_for(&config, EmpireId(1), Aggression::Typical).unwrap();
        let engine = PriorityEngine::new(config, coefficients);
        let snapshot = WorldSnapshot {
            turn: 1,
            empire_id: EmpireId(1),
            has_capital: true,
            industry: 15.0,
            research: 8.0,
            colonies: 1,
            ..Default::default()
        };

        let (a, warnings) = engine.compute(&snapshot, &PriorityState::default());
        let (b, _) = engine.compute(&snapshot, &PriorityState::default());
        assert!(warnings.is_empty());
        assert_eq!(a, b);
        assert_eq!(a.iter().count(), Domain::COUNT);
        for (domain, score) in a.iter() {
            assert!(score >= 0.0, "{domain} scored {score}");
        }
        assert_eq!(a.get(Domain::Learning), 100.0);
    }
}
