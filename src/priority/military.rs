//! Warship demand from root-sum threat aggregation
//!
//! Threat sources are combined per system as a sum of square roots, the
//! empire's own fleet and defenses are subtracted the same way, and the
//! squared shortfall is converted into ships of the current best design.

use ahash::AHashSet;

use crate::core::config::MonsterScaling;
use crate::core::types::{SystemId, Tick};
use crate::priority::expansion::viable_targets;
use crate::priority::invasion::allotted_invasion_targets;
use crate::priority::ScoringContext;
use crate::snapshot::SystemThreat;

/// Damp big monsters early in the game so they do not drive production
pub fn scaled_monster_threat(threat: f64, turn: Tick, scaling: &MonsterScaling) -> f64 {
    if turn <= scaling.early_turn {
        if threat > scaling.early_cap {
            0.0
        } else {
            threat
        }
    } else if turn <= scaling.mid_turn {
        if threat >= scaling.big_monster {
            0.0
        } else {
            threat
        }
    } else if turn <= scaling.late_turn {
        if threat >= scaling.big_monster {
            let phase_in = turn as f64 / scaling.mid_turn as f64 - 1.0;
            scaling.big_monster + phase_in * (threat - scaling.big_monster)
        } else {
            threat
        }
    } else {
        threat
    }
}

/// Combined threat of one system, in square-root units
pub fn threat_root(system: &SystemThreat, turn: Tick, ctx: &ScoringContext) -> f64 {
    let cfg = &ctx.config.military;
    let st = &system.status;
    let monster = scaled_monster_threat(st.monster_threat.max(0.0), turn, &cfg.monster);

    let mut root = st.fleet_threat.max(0.0).sqrt() + monster.sqrt() + st.planet_threat.max(0.0).sqrt();
    if system.owned {
        root += cfg.max_neighbor_weight * st.max_neighbor_threat.max(0.0).sqrt()
            + cfg.neighbor_weight * st.neighbor_threat.max(0.0).sqrt();
    }
    root
}

/// Systems the military must cover: owned ones plus those holding the
/// targets the other domains are pursuing
fn target_systems(ctx: &ScoringContext) -> AHashSet<SystemId> {
    let s = ctx.snapshot;
    let allotted = ctx.allotted_colony_targets;

    let mut systems: AHashSet<SystemId> = allotted_invasion_targets(ctx).iter().map(|t| t.system).collect();
    for target in viable_targets(&s.colony_targets, f64::NEG_INFINITY, allotted) {
        systems.insert(target.system);
    }
    for target in viable_targets(&s.outpost_targets, f64::NEG_INFINITY, allotted) {
        systems.insert(target.system);
    }
    systems
}

/// Warships needed to cover every relevant system
pub fn ships_needed(ctx: &ScoringContext) -> f64 {
    let s = ctx.snapshot;
    // A zero rating would make every shortfall infinite
    let rating = if s.best_ship_rating > 0.0 { s.best_ship_rating } else { 1.0 };
    let targets = target_systems(ctx);

    s.systems
        .iter()
        .filter(|system| system.owned || targets.contains(&system.id()))
        .map(|system| {
            let own = system.status.my_fleet_rating.max(0.0).sqrt() + system.status.my_defenses.max(0.0).sqrt();
            let shortfall = (threat_root(system, s.turn, ctx) - own).max(0.0);
            (shortfall * shortfall / rating).ceil()
        })
        .sum()
}

pub fn military(ctx: &ScoringContext) -> f64 {
    let s = ctx.snapshot;
    let cfg = &ctx.config.military;
    if !s.has_capital {
        return 0.0;
    }

    let mut priority = (s.turn as f64).min(cfg.floor_cap) + cfg.per_ship * ships_needed(ctx);

    let basic_weapons = s.any_complete(&cfg.basic_weapon_techs);
    let advanced_weapons = s.any_complete(&cfg.advanced_weapon_techs);
    if !basic_weapons {
        priority /= cfg.no_weapons_divisor;
    } else if !(advanced_weapons && s.any_sightings()) {
        priority /= cfg.no_advanced_divisor;
    }

    priority.max(0.0)
}
