//! Exploration, colonisation and outpost demand
//!
//! Colonisation and outposts are saturating demands: the score compares the
//! number of worthwhile targets with the ships already available. When there
//! is nothing worth claiming the score is the sentinel 1, never 0, so the
//! production side keeps a trickle of interest.

use std::cmp::Ordering;

use crate::core::config::PlannerConfig;
use crate::game::ColonyTarget;
use crate::priority::{Domain, PriorityState, ScoringContext};
use crate::snapshot::WorldSnapshot;

/// Score returned when no viable target exists
pub const NO_TARGET_SENTINEL: f64 = 1.0;

/// Targets scoring above `threshold`, best first, at most `cap` of them
pub fn viable_targets(targets: &[ColonyTarget], threshold: f64, cap: usize) -> Vec<&ColonyTarget> {
    let mut viable: Vec<&ColonyTarget> = targets.iter().filter(|t| t.score > threshold).collect();
    viable.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.planet.cmp(&b.planet))
    });
    viable.truncate(cap);
    viable
}

/// How many colony targets the empire can afford to chase
pub fn allotted_colony_targets(snapshot: &WorldSnapshot, config: &PlannerConfig, prior: &PriorityState) -> usize {
    let cfg = &config.colonization;
    let colonies = snapshot.colonies as f64;

    let sighted = usize::from(snapshot.any_sightings());
    let parity = (snapshot.empire_id.0 % 2) as usize;
    let mut portion = cfg.portion[sighted][parity];

    let prior_military = prior.get(Domain::Military);
    if prior_military < cfg.military_low {
        portion *= cfg.military_low_factor;
    } else if prior_military < cfg.military_mid {
        portion *= cfg.military_mid_factor;
    } else if snapshot.turn > cfg.late_turn {
        portion *= cfg.late_decay.powf(colonies / cfg.late_decay_colonies);
    }

    let colony_cost = cfg.base_cost * (1.0 + cfg.cost_per_colony * colonies);
    let affordable = snapshot.industry * cfg.turns_to_build * portion / colony_cost;
    1 + affordable.max(0.0).floor() as usize
}

/// True once the colony count exceeds what the aggression level supports
/// at this turn
pub fn over_growth_barrier(snapshot: &WorldSnapshot, config: &PlannerConfig) -> bool {
    let cfg = &config.colonization;
    let spread = cfg.barrier_aggression_offset + snapshot.aggression.level();
    let barrier = cfg.barrier_base + spread * spread * snapshot.turn as f64 / cfg.barrier_turns;
    snapshot.colonies as f64 > barrier
}

/// Colony targets counted this tick
pub fn viable_colony_targets<'a>(ctx: &ScoringContext<'a>) -> Vec<&'a ColonyTarget> {
    let cfg = &ctx.config.colonization;
    viable_targets(
        &ctx.snapshot.colony_targets,
        cfg.min_target_score,
        ctx.allotted_colony_targets + cfg.target_margin,
    )
}

/// Outpost targets counted this tick
pub fn viable_outpost_targets<'a>(ctx: &ScoringContext<'a>) -> Vec<&'a ColonyTarget> {
    let cfg = &ctx.config.outpost;
    viable_targets(
        &ctx.snapshot.outpost_targets,
        cfg.base_cost / cfg.score_divisor,
        ctx.allotted_colony_targets,
    )
}

/// Scout demand
pub fn exploration(ctx: &ScoringContext) -> f64 {
    let s = ctx.snapshot;
    let cfg = &ctx.config.exploration;

    let by_fleet = cfg.base_scouts + (s.fleets.military_ships / cfg.military_ships_per_scout) as f64;
    let by_turn = cfg.base_scouts + (s.turn / cfg.turns_per_scout) as f64;
    let by_map = cfg.unexplored_base + (s.unexplored_systems as f64).sqrt();
    let have = (s.fleets.scouts + s.queued_scouts) as f64;

    let needed = (by_fleet.min(by_turn).min(by_map) - have).max(0.0);
    (cfg.weight * needed).floor()
}

/// Colony ship demand
pub fn colonization(ctx: &ScoringContext) -> f64 {
    let cfg = &ctx.config.colonization;
    let viable = viable_colony_targets(ctx).len();
    if viable == 0 {
        return NO_TARGET_SENTINEL;
    }
    if ctx.over_growth_barrier {
        return 0.0;
    }

    let viable = viable as f64;
    let ships = ctx.snapshot.fleets.idle_colony_ships as f64;
    let priority = cfg.weight * (1.0 + viable - ships) / (viable + 1.0);
    priority.max(NO_TARGET_SENTINEL)
}

/// Outpost ship demand
pub fn outpost(ctx: &ScoringContext) -> f64 {
    let cfg = &ctx.config.outpost;
    if !ctx.snapshot.is_complete(&cfg.gate_tech) {
        return 0.0;
    }
    let viable = viable_outpost_targets(ctx).len();
    if viable == 0 {
        return NO_TARGET_SENTINEL;
    }

    let viable = viable as f64;
    let ships = ctx.snapshot.fleets.idle_outpost_ships as f64;
    let priority = cfg.weight * (viable - ships) / viable;
    priority.max(NO_TARGET_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Aggression, EmpireId, PlanetId, SystemId, TechId};
    use crate::research::catalog::TechStatus;
    use crate::style::{coefficients_for, CoefficientTable};

    fn target(planet: u32, score: f64) -> ColonyTarget {
        ColonyTarget {
            planet: PlanetId(planet),
            system: SystemId(planet),
            score,
        }
    }

    fn base_snapshot() -> WorldSnapshot {
        WorldSnapshot {
            turn: 10,
            empire_id: EmpireId(0),
            aggression: Aggression::Typical,
            has_capital: true,
            industry: 100.0,
            colonies: 1,
            ..Default::default()
        }
    }

    fn with_ctx<R>(snapshot: &WorldSnapshot, f: impl FnOnce(&ScoringContext) -> R) -> R {
        let config = PlannerConfig::default();
        let coefficients: CoefficientTable =
            coefficients_for(&config, snapshot.empire_id, snapshot.aggression).unwrap();
        let prior = PriorityState::default();
        let ctx = ScoringContext::new(snapshot, &config, &coefficients, &prior);
        f(&ctx)
    }

    #[test]
    fn test_colonization_saturating_demand() {
        let mut snapshot = base_snapshot();
        snapshot.colony_targets = (1..=5).map(|i| target(i, 100.0 + i as f64)).collect();
        snapshot.fleets.idle_colony_ships = 2;

        let priority = with_ctx(&snapshot, |ctx| {
            assert!(ctx.allotted_colony_targets + 2 >= 5);
            colonization(ctx)
        });
        // 60 * (1 + 5 - 2) / (5 + 1)
        assert!((priority - 40.0).abs() < 1e-9, "got {priority}");
    }

    #[test]
    fn test_colonization_without_targets_is_sentinel() {
        let mut snapshot = base_snapshot();
        snapshot.colony_targets = vec![target(1, 30.0)];
        assert_eq!(with_ctx(&snapshot, colonization), 1.0);

        // Still the sentinel when the growth barrier is exceeded
        snapshot.colonies = 50;
        assert_eq!(with_ctx(&snapshot, colonization), 1.0);
    }

    #[test]
    fn test_colonization_over_barrier_is_zero() {
        let mut snapshot = base_snapshot();
        snapshot.colony_targets = vec![target(1, 100.0)];
        snapshot.colonies = 50;
        assert_eq!(with_ctx(&snapshot, colonization), 0.0);
    }

    #[test]
    fn test_colonization_floor_is_one() {
        let mut snapshot = base_snapshot();
        snapshot.colony_targets = vec![target(1, 100.0)];
        snapshot.fleets.idle_colony_ships = 5;
        assert_eq!(with_ctx(&snapshot, colonization), 1.0);
    }

    #[test]
    fn test_allotment_grows_with_industry() {
        let config = PlannerConfig::default();
        let prior = PriorityState::default();
        let mut snapshot = base_snapshot();
        snapshot.industry = 0.0;
        assert_eq!(allotted_colony_targets(&snapshot, &config, &prior), 1);
        snapshot.industry = 100.0;
        // 100 * 8 * 0.6 / (120 * 1.06) = 3.77
        assert_eq!(allotted_colony_targets(&snapshot, &config, &prior), 4);
    }

    #[test]
    fn test_outpost_needs_gate_tech() {
        let mut snapshot = base_snapshot();
        snapshot.outpost_targets = vec![target(1, 50.0), target(2, 40.0)];
        assert_eq!(with_ctx(&snapshot, outpost), 0.0);

        snapshot
            .tech_status
            .insert(TechId::from("CON_ENV_ENCAPSUL"), TechStatus::Complete);
        snapshot.fleets.idle_outpost_ships = 1;
        // 50 * (2 - 1) / 2
        assert_eq!(with_ctx(&snapshot, outpost), 25.0);

        snapshot.outpost_targets.clear();
        assert_eq!(with_ctx(&snapshot, outpost), 1.0);
    }

    #[test]
    fn test_exploration_scout_demand() {
        let mut snapshot = base_snapshot();
        snapshot.unexplored_systems = 16;
        snapshot.fleets.scouts = 1;
        snapshot.queued_scouts = 1;
        // min(4, 4, 2 + 4) - 2 = 2
        assert_eq!(with_ctx(&snapshot, exploration), 80.0);

        snapshot.fleets.scouts = 6;
        assert_eq!(with_ctx(&snapshot, exploration), 0.0);
    }

    #[test]
    fn test_viable_targets_sorted_and_capped() {
        let targets = vec![target(1, 70.0), target(2, 90.0), target(3, 10.0), target(4, 80.0)];
        let viable = viable_targets(&targets, 60.0, 2);
        let ids: Vec<u32> = viable.iter().map(|t| t.planet.0).collect();
        assert_eq!(ids, vec![2, 4]);
    }
}
