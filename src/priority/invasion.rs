//! Troop ship demand

use std::cmp::Ordering;

use crate::core::config::PlannerConfig;
use crate::core::types::Aggression;
use crate::game::InvasionTarget;
use crate::priority::expansion::NO_TARGET_SENTINEL;
use crate::priority::ScoringContext;
use crate::snapshot::WorldSnapshot;

/// Invasion targets considered this turn: one more every `turns_per_target`
pub fn allotted_targets(snapshot: &WorldSnapshot, config: &PlannerConfig) -> usize {
    1 + (snapshot.turn / config.invasion.turns_per_target) as usize
}

/// The best `allotted` targets, regardless of score
pub fn allotted_invasion_targets<'a>(ctx: &ScoringContext<'a>) -> Vec<&'a InvasionTarget> {
    let mut targets: Vec<&InvasionTarget> = ctx.snapshot.invasion_targets.iter().collect();
    targets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.planet.cmp(&b.planet))
    });
    targets.truncate(ctx.allotted_invasion_targets);
    targets
}

pub fn invasion(ctx: &ScoringContext) -> f64 {
    let s = ctx.snapshot;
    let cfg = &ctx.config.invasion;

    if ctx.over_growth_barrier {
        return 0.0;
    }
    if s.aggression == Aggression::Beginner && s.turn < cfg.beginner_until_turn {
        return 0.0;
    }

    let viable: Vec<&InvasionTarget> = allotted_invasion_targets(ctx)
        .into_iter()
        .filter(|t| t.score > 0.0)
        .collect();
    if viable.is_empty() {
        return NO_TARGET_SENTINEL;
    }

    let best_colony = s
        .colony_targets
        .iter()
        .map(|t| t.score)
        .fold(cfg.min_colony_score, f64::max);
    let multiplier = 1.0 + viable.iter().filter(|t| t.score > best_colony).count() as f64;

    let troops_needed: f64 = viable.iter().map(|t| t.troops.max(0.0) + cfg.troop_margin).sum();
    let pods_needed = (troops_needed / cfg.troops_per_pod).floor();
    let pods_available = (s.fleets.troop_pods + s.queued_troop_pods) as f64;
    let pods_per_ship = s.troop_pods_per_ship.max(1) as f64;
    let ships_needed = ((pods_needed - pods_available) / pods_per_ship).ceil();

    let mut priority = multiplier * (cfg.base + cfg.per_ship * ships_needed.max(0.0));

    if s.colony_status.under_attack == 0 {
        if s.colony_status.under_threat == 0 {
            priority *= cfg.safe_factor;
        } else {
            priority *= cfg.threatened_factor;
        }
    }
    if !s.any_sightings() {
        priority *= cfg.unsighted_factor;
    }
    if s.aggression == Aggression::Beginner {
        priority *= cfg.beginner_factor;
    }

    priority.max(0.0)
}
