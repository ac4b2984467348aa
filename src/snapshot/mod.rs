//! Immutable per-tick world snapshot
//!
//! Everything the score engine and the queue scheduler read about the game
//! is copied into a `WorldSnapshot` once per tick by the collector. Missing
//! facts are already defaulted (zero, empty) by the time anything reads them.

pub mod collector;

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::core::types::{Aggression, EmpireId, SystemId, TechId, Tick};
use crate::game::{ColonyStatus, ColonyTarget, InvasionTarget, SystemStatus};
use crate::research::acceleration::EmpireTag;
use crate::research::catalog::TechStatus;
use crate::research::queue::QueueItem;

pub use collector::collect;

/// Ship counts derived from owned fleets
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FleetCounts {
    pub scouts: u32,
    pub military_ships: u32,
    /// Colony ships without a mission
    pub idle_colony_ships: u32,
    pub idle_outpost_ships: u32,
    /// Troop pods aboard invasion fleets
    pub troop_pods: u32,
}

/// Threat record of one system plus whether the empire owns a planet there
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemThreat {
    pub status: SystemStatus,
    pub owned: bool,
}

impl SystemThreat {
    pub fn id(&self) -> SystemId {
        self.status.id
    }
}

/// Read-only facts for one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldSnapshot {
    pub turn: Tick,
    pub empire_id: EmpireId,
    pub aggression: Aggression,
    pub has_capital: bool,

    /// Current industry output (PP)
    pub industry: f64,
    /// Current research output (RP)
    pub research: f64,
    pub target_industry: f64,
    pub target_research: f64,
    pub population: f64,
    pub researchers: f64,

    pub colonies: usize,
    pub outposts: usize,
    pub colony_status: ColonyStatus,
    pub fleets: FleetCounts,
    pub queued_scouts: u32,
    pub queued_troop_pods: u32,
    /// Rating of the best buildable warship (0 when none)
    pub best_ship_rating: f64,
    pub best_ship_cost: f64,
    pub troop_pods_per_ship: u32,
    /// Number of planet types the best colonizing species finds Adequate
    pub best_colonizer_adequate_types: usize,

    pub tech_status: AHashMap<TechId, TechStatus>,
    pub research_queue: Vec<QueueItem>,
    /// Turn -> enemy ships sighted on that turn
    pub sightings: BTreeMap<Tick, u32>,

    pub systems: Vec<SystemThreat>,
    pub colony_targets: Vec<ColonyTarget>,
    pub outpost_targets: Vec<ColonyTarget>,
    pub invasion_targets: Vec<InvasionTarget>,
    pub unexplored_systems: usize,
    pub tags: AHashSet<EmpireTag>,
}

impl WorldSnapshot {
    /// Status of a tech; unknown techs count as researchable
    pub fn tech_status(&self, tech: &TechId) -> TechStatus {
        self.tech_status.get(tech).copied().unwrap_or_default()
    }

    pub fn is_complete(&self, tech: &TechId) -> bool {
        self.tech_status(tech).is_complete()
    }

    /// True when any of `techs` is complete
    pub fn any_complete(&self, techs: &[TechId]) -> bool {
        techs.iter().any(|t| self.is_complete(t))
    }

    pub fn has_tag(&self, tag: EmpireTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn any_sightings(&self) -> bool {
        !self.sightings.is_empty()
    }

    /// Number of distinct turns with enemy sightings
    pub fn sighting_turns(&self) -> usize {
        self.sightings.len()
    }

    /// Sighting turns within the last `window` turns
    pub fn recent_sighting_turns(&self, window: Tick) -> usize {
        let since = self.turn.saturating_sub(window);
        self.sightings.range(since + 1..).count()
    }

    /// Predicted turns left of `tech` when it is among the first `horizon`
    /// queue items
    pub fn queued_turns_left(&self, tech: &TechId, horizon: usize) -> Option<i32> {
        self.research_queue
            .iter()
            .take(horizon)
            .find(|item| &item.tech == tech)
            .map(|item| item.turns_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tech_is_researchable() {
        let snapshot = WorldSnapshot::default();
        let tech = TechId::from("GRO_PLANET_ECOL");
        assert_eq!(snapshot.tech_status(&tech), TechStatus::Researchable);
        assert!(!snapshot.is_complete(&tech));
    }

    #[test]
    fn test_recent_sightings_window() {
        let mut snapshot = WorldSnapshot {
            turn: 30,
            ..Default::default()
        };
        for turn in [5, 21, 22, 25, 30] {
            snapshot.sightings.insert(turn, 1);
        }
        assert_eq!(snapshot.sighting_turns(), 5);
        // Turns 23..=30
        assert_eq!(snapshot.recent_sighting_turns(8), 2);
    }

    #[test]
    fn test_recent_sightings_early_game() {
        let mut snapshot = WorldSnapshot {
            turn: 3,
            ..Default::default()
        };
        snapshot.sightings.insert(1, 2);
        assert_eq!(snapshot.recent_sighting_turns(8), 1);
    }
}
