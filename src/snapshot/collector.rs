//! Snapshot collector
//!
//! The only code that talks to `GameView`. Unknown meters become zero with a
//! `MissingData` warning; nothing here can fail the tick.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

use crate::core::error::TickWarning;
use crate::game::{
    BuildType, FleetRole, GameView, PlanetEnvironment, PlanetType, ResourceKind, ShipRole, StarType,
};
use crate::research::acceleration::EmpireTag;
use crate::research::catalog::{TechCatalog, TechStatus};
use crate::snapshot::{FleetCounts, SystemThreat, WorldSnapshot};

/// Special marking planets with ancient ruins
pub const ANCIENT_RUINS_SPECIAL: &str = "ANCIENT_RUINS_SPECIAL";

/// Species tag marking telepathic species
pub const TELEPATHIC_TAG: &str = "TELEPATHIC";

/// Build the snapshot for the current tick
pub fn collect<G: GameView + ?Sized>(
    view: &G,
    catalog: &TechCatalog,
) -> (WorldSnapshot, Vec<TickWarning>) {
    let mut warnings = Vec::new();
    let mut meter = |value: Option<f64>, what: &str| -> f64 {
        match value {
            Some(v) if v.is_finite() => v.max(0.0),
            _ => {
                warnings.push(TickWarning::missing(what));
                0.0
            }
        }
    };

    let industry = meter(view.resource_production(ResourceKind::Industry), "industry output");
    let research = meter(view.resource_production(ResourceKind::Research), "research output");
    let population = meter(view.population(), "population");
    let researchers = meter(view.researchers(), "researchers");

    let planets = view.owned_planets();
    let mut tags = AHashSet::new();
    let mut colonies = 0;
    let mut outposts = 0;
    let mut target_industry = 0.0;
    let mut target_research = 0.0;
    let mut owned_systems = AHashSet::new();
    let mut species_names: Vec<String> = Vec::new();

    for planet in &planets {
        owned_systems.insert(planet.system);
        if planet.population > 0.0 {
            colonies += 1;
        } else {
            outposts += 1;
        }
        target_industry += planet.target_industry;
        target_research += planet.target_research;

        if planet.star == StarType::BlackHole {
            tags.insert(EmpireTag::BlackHole);
        }
        match planet.planet_type {
            PlanetType::Asteroids => {
                tags.insert(EmpireTag::AsteroidBelt);
            }
            PlanetType::GasGiant => {
                tags.insert(EmpireTag::GasGiant);
            }
            _ => {}
        }
        if planet.specials.iter().any(|s| s == ANCIENT_RUINS_SPECIAL) {
            tags.insert(EmpireTag::AncientRuins);
        }
        if let Some(name) = &planet.species {
            if !species_names.contains(name) {
                species_names.push(name.clone());
            }
        }
    }

    let mut best_colonizer_adequate_types = 0;
    for name in &species_names {
        let Some(species) = view.species(name) else {
            warnings.push(TickWarning::missing(format!("species {name}")));
            continue;
        };
        if species.tags.iter().any(|t| t == TELEPATHIC_TAG) {
            tags.insert(EmpireTag::Telepathic);
        }
        if species.can_colonize {
            let adequate = PlanetType::HABITABLE
                .iter()
                .filter(|pt| species.environment(**pt) == PlanetEnvironment::Adequate)
                .count();
            best_colonizer_adequate_types = best_colonizer_adequate_types.max(adequate);
        }
    }

    let mut fleets = FleetCounts::default();
    for fleet in view.fleets() {
        match fleet.role {
            FleetRole::Exploration => fleets.scouts += fleet.ships,
            FleetRole::Military => fleets.military_ships += fleet.ships,
            FleetRole::Colonisation if !fleet.has_mission => fleets.idle_colony_ships += fleet.ships,
            FleetRole::Outpost if !fleet.has_mission => fleets.idle_outpost_ships += fleet.ships,
            FleetRole::Invasion => fleets.troop_pods += fleet.troop_pods,
            _ => {}
        }
    }

    let mut queued_scouts = 0;
    let mut queued_troop_pods = 0;
    for element in view.production_queue() {
        if element.build_type != BuildType::Ship {
            continue;
        }
        let ships = element.remaining * element.block_size;
        match element.role {
            ShipRole::Scout => queued_scouts += ships,
            ShipRole::Troopship | ShipRole::TroopBase => queued_troop_pods += ships * element.troop_pods,
            _ => {}
        }
    }

    let mut tech_status = AHashMap::with_capacity(catalog.len());
    for tech in catalog.ids() {
        let status = match view.tech_status(tech) {
            Some(status) => status,
            None => {
                warnings.push(TickWarning::missing(format!("status of {tech}")));
                TechStatus::Researchable
            }
        };
        tech_status.insert(tech.clone(), status);
    }

    let systems = view
        .system_statuses()
        .into_iter()
        .map(|status| SystemThreat {
            owned: owned_systems.contains(&status.id),
            status,
        })
        .collect();

    let (best_ship_rating, best_ship_cost) = match view.best_military_ship() {
        Some(ship) => (ship.rating.max(0.0), ship.cost.max(0.0)),
        None => (0.0, 0.0),
    };

    let snapshot = WorldSnapshot {
        turn: view.current_turn(),
        empire_id: view.empire_id(),
        aggression: view.aggression(),
        has_capital: view.capital().is_some(),
        industry,
        research,
        target_industry,
        target_research,
        population,
        researchers,
        colonies,
        outposts,
        colony_status: view.colony_status(),
        fleets,
        queued_scouts,
        queued_troop_pods,
        best_ship_rating,
        best_ship_cost,
        troop_pods_per_ship: view.best_troop_ship_pods().unwrap_or(0),
        best_colonizer_adequate_types,
        tech_status,
        research_queue: view.research_queue(),
        sightings: view.enemy_sightings(),
        systems,
        colony_targets: view.colony_targets(),
        outpost_targets: view.outpost_targets(),
        invasion_targets: view.invasion_targets(),
        unexplored_systems: view.unexplored_border_systems(),
        tags,
    };

    for warning in &warnings {
        warn!(turn = snapshot.turn, "{}", warning);
    }
    debug!(
        turn = snapshot.turn,
        colonies = snapshot.colonies,
        industry = snapshot.industry,
        research = snapshot.research,
        queue_len = snapshot.research_queue.len(),
        "snapshot collected"
    );

    (snapshot, warnings)
}
