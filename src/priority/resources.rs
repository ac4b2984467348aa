//! Production baseline and the research curve

use crate::priority::ScoringContext;
use crate::research::acceleration::EmpireTag;

/// Fixed production baseline
pub fn production(ctx: &ScoringContext) -> f64 {
    ctx.config.production.base
}

/// Trade research for industry while a young, aggressive empire with gas
/// giant generators in reach is still small
pub fn industry_surge(ctx: &ScoringContext) -> bool {
    let s = ctx.snapshot;
    let curve = &ctx.config.research_curve;
    let surge = &curve.surge;

    let orbital_gen_in_reach = s
        .research_queue
        .iter()
        .take(surge.queue_window)
        .any(|item| item.tech == curve.orbital_gen_tech)
        || s.is_complete(&curve.orbital_gen_tech);

    s.aggression > surge.above_aggression
        && s.industry + surge.research_weight * s.research
            < surge.output_per_aggression * s.aggression.level()
        && orbital_gen_in_reach
        && s.has_tag(EmpireTag::GasGiant)
        && s.colonies < surge.colony_cap
}

/// Research demand relative to the production baseline
///
/// Adjustments are applied in a fixed order: regime, surge, network bonus,
/// truncation, then the two sighting factors.
pub fn research(ctx: &ScoringContext, production: f64) -> f64 {
    let s = ctx.snapshot;
    let curve = &ctx.config.research_curve;
    let [c0, c1, c2, c3] = ctx.coefficients.research_cutoffs;
    let settings = ctx.coefficients.research_settings;
    let turn = s.turn;

    let booster = s.is_complete(&curve.booster_tech);
    let orbital_gen = s.is_complete(&curve.orbital_gen_tech);

    let mut priority = if turn < c0 || !booster || (ctx.coefficients.style_index == 0 && !orbital_gen) {
        settings[0] * production
    } else if !orbital_gen || turn < c1 {
        settings[1] * production
    } else if turn < c2 {
        settings[2] * production
    } else if turn < c3 {
        settings[3] * production
    } else {
        late_game_taper(ctx, settings[4] * production, production)
    };

    if industry_surge(ctx) {
        priority *= curve.surge.factor;
    }

    if s.is_complete(&curve.network_tech) {
        priority = (priority + curve.network_bonus * production).min(priority * curve.network_cap);
    }

    priority = priority.trunc();

    let sighting_turns = s.sighting_turns() as f64;
    if sighting_turns < curve.sparse_sightings_base + turn as f64 / curve.sparse_sightings_turns {
        priority *= curve.sparse_factor;
    }

    if turn > curve.hostile_after_turn && s.recent_sighting_turns(curve.recent_window) > curve.recent_threshold {
        priority *= curve.hostile_factor;
    }

    priority
}

/// Wind research down as the queue runs dry
fn late_game_taper(ctx: &ScoringContext, late: f64, production: f64) -> f64 {
    let curve = &ctx.config.research_curve;
    let queue = &ctx.snapshot.research_queue;
    let n = queue.len();
    let last_allocating = queue.last().map(|item| item.is_allocating()).unwrap_or(false);

    if n == 0 {
        0.0
    } else if n < curve.few_items_limit && last_allocating {
        n as f64 * curve.taper_unit * production
    } else if n < curve.some_items_limit && last_allocating {
        (curve.some_items_base + curve.some_items_step * n as f64) * curve.taper_unit * production
    } else if n < curve.half_items_limit && queue[n / 2].is_allocating() {
        late * curve.half_point_factor
    } else {
        late
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PlannerConfig;
    use crate::core::types::{Aggression, EmpireId, TechId};
    use crate::priority::PriorityState;
    use crate::research::acceleration::EmpireTag;
    use crate::research::catalog::TechStatus;
    use crate::research::queue::QueueItem;
    use crate::snapshot::WorldSnapshot;
    use crate::style::coefficients_for;

    fn complete(snapshot: &mut WorldSnapshot, tech: &str) {
        snapshot.tech_status.insert(TechId::from(tech), TechStatus::Complete);
    }

    fn allocating(tech: &str, allocation: f64) -> QueueItem {
        QueueItem {
            tech: TechId::from(tech),
            allocation,
            turns_left: 3,
        }
    }

    /// Late-game snapshot with plenty of old sightings so neither sighting
    /// factor applies
    fn late_snapshot() -> WorldSnapshot {
        let mut snapshot = WorldSnapshot {
            turn: 150,
            empire_id: EmpireId(0),
            aggression: Aggression::Typical,
            has_capital: true,
            ..Default::default()
        };
        complete(&mut snapshot, "LRN_ALGO_ELEGANCE");
        complete(&mut snapshot, "PRO_ORBITAL_GEN");
        for turn in 1..=10 {
            snapshot.sightings.insert(turn, 1);
        }
        snapshot
    }

    fn score(snapshot: &WorldSnapshot, config: &PlannerConfig) -> f64 {
        let coefficients = coefficients_for(config, snapshot.empire_id, snapshot.aggression).unwrap();
        let prior = PriorityState::default();
        let ctx = ScoringContext::new(snapshot, config, &coefficients, &prior);
        research(&ctx, production(&ctx))
    }

    #[test]
    fn test_few_items_left_taper() {
        let mut config = PlannerConfig::default();
        config.production.base = 200.0;
        let mut snapshot = late_snapshot();
        snapshot.research_queue = vec![
            allocating("A", 5.0),
            allocating("B", 5.0),
            allocating("C", 2.0),
        ];

        // 3 * 0.01 * 200
        assert_eq!(score(&snapshot, &config), 6.0);
    }

    #[test]
    fn test_some_items_left_taper() {
        let config = PlannerConfig::default();
        let mut snapshot = late_snapshot();
        snapshot.research_queue = (0..6).map(|i| allocating(&format!("T{i}"), 1.0)).collect();

        // (4 + 2 * 6) * 0.01 * 50 = 8
        assert_eq!(score(&snapshot, &config), 8.0);
    }

    #[test]
    fn test_empty_queue_late_game_is_zero() {
        let config = PlannerConfig::default();
        let snapshot = late_snapshot();
        assert_eq!(score(&snapshot, &config), 0.0);
    }

    #[test]
    fn test_opening_regime_without_booster() {
        let config = PlannerConfig::default();
        let snapshot = WorldSnapshot {
            turn: 60,
            empire_id: EmpireId(1),
            ..Default::default()
        };
        // style 1: 1.5 * 50 = 75, few sightings so * 1.2
        assert_eq!(score(&snapshot, &config), 90.0);
    }

    #[test]
    fn test_hostile_neighbourhood_cuts_research() {
        let config = PlannerConfig::default();
        let mut snapshot = WorldSnapshot {
            turn: 40,
            empire_id: EmpireId(1),
            ..Default::default()
        };
        for turn in 30..=40 {
            snapshot.sightings.insert(turn, 3);
        }
        // 75 * 0.6, sightings are not sparse (11 >= 2 + 2)
        assert!((score(&snapshot, &config) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_industry_surge_halves_research() {
        let config = PlannerConfig::default();
        let mut snapshot = WorldSnapshot {
            turn: 10,
            empire_id: EmpireId(1),
            aggression: Aggression::Aggressive,
            industry: 20.0,
            research: 10.0,
            colonies: 2,
            ..Default::default()
        };
        snapshot.tags.insert(EmpireTag::GasGiant);
        snapshot.research_queue = vec![allocating("PRO_ORBITAL_GEN", 4.0)];
        for turn in 1..=5 {
            snapshot.sightings.insert(turn, 1);
        }

        let coefficients = coefficients_for(&config, snapshot.empire_id, snapshot.aggression).unwrap();
        let prior = PriorityState::default();
        let ctx = ScoringContext::new(&snapshot, &config, &coefficients, &prior);
        assert!(industry_surge(&ctx));
        // 1.5 * 50 * 0.5 = 37.5 -> 37, 5 sightings >= 2 + 0.5
        assert_eq!(research(&ctx, 50.0), 37.0);
    }

    #[test]
    fn test_network_bonus_is_capped() {
        let config = PlannerConfig::default();
        let mut snapshot = late_snapshot();
        complete(&mut snapshot, "LRN_QUANT_NET");
        snapshot.research_queue = (0..30).map(|i| allocating(&format!("T{i}"), 0.0)).collect();

        // 0.35 * 50 = 17.5; min(17.5 + 5, 17.5 * 1.3 = 22.75) = 22.5 -> 22
        assert_eq!(score(&snapshot, &config), 22.0);
    }
}
