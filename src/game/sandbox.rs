//! In-memory sandbox empire
//!
//! Implements both collaborator traits without a game behind them. The
//! research queue is simulated turn by turn so a planner can be driven for a
//! whole run; everything else is plain data the caller may edit between
//! turns. With a seed, `advance_turn` also jitters threats and enemy
//! sightings from a deterministic `ChaCha8Rng`.

use std::collections::BTreeMap;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::core::error::CommandError;
use crate::core::types::{Aggression, EmpireId, PlanetId, SystemId, TechId, Tick};
use crate::game::{
    ColonyStatus, ColonyTarget, FleetRole, FleetView, GameView, InvasionTarget, OrderSink,
    PlanetEnvironment, PlanetType, PlanetView, ProductionElement, ResourceKind, ShipRating,
    SpeciesView, StarType, SystemStatus,
};
use crate::priority::Domain;
use crate::research::catalog::{TechCatalog, TechStatus};
use crate::research::queue::{QueueItem, NO_PREDICTION};

/// Species living on every sandbox capital
pub const CAPITAL_SPECIES: &str = "SP_HUMAN";

/// Progress short of a tech's cost by less than this counts as finished
const COMPLETION_EPSILON: f64 = 1e-6;

pub struct SandboxEmpire {
    pub empire_id: EmpireId,
    pub aggression: Aggression,
    pub turn: Tick,
    catalog: TechCatalog,
    pub tech_status: AHashMap<TechId, TechStatus>,
    queue: Vec<QueueItem>,
    /// Research points spent so far per tech
    progress: AHashMap<TechId, f64>,

    pub industry: Option<f64>,
    pub research: Option<f64>,
    pub population: Option<f64>,
    pub researchers: Option<f64>,

    pub capital: Option<PlanetId>,
    pub planets: Vec<PlanetView>,
    pub species: Vec<SpeciesView>,
    pub fleets: Vec<FleetView>,
    pub production: Vec<ProductionElement>,
    pub systems: Vec<SystemStatus>,
    pub colony_targets: Vec<ColonyTarget>,
    pub outpost_targets: Vec<ColonyTarget>,
    pub invasion_targets: Vec<InvasionTarget>,
    pub unexplored_systems: usize,
    pub sightings: BTreeMap<Tick, u32>,
    pub colony_status: ColonyStatus,
    pub best_ship: Option<ShipRating>,
    pub troop_ship_pods: Option<u32>,

    /// Last score received per domain
    pub published: BTreeMap<Domain, f64>,
    /// When set, every queue order fails with this error
    pub reject_orders: Option<CommandError>,
    rng: Option<ChaCha8Rng>,
}

impl SandboxEmpire {
    /// A one-planet empire on turn 1 with nothing researched
    pub fn new(empire_id: EmpireId, aggression: Aggression, catalog: TechCatalog) -> Self {
        let tech_status = catalog
            .ids()
            .map(|id| (id.clone(), TechStatus::Researchable))
            .collect();
        let capital = PlanetId(empire_id.0 * 100 + 1);

        Self {
            empire_id,
            aggression,
            turn: 1,
            catalog,
            tech_status,
            queue: Vec::new(),
            progress: AHashMap::new(),
            industry: Some(15.0),
            research: Some(6.0),
            population: Some(15.0),
            researchers: Some(5.0),
            capital: Some(capital),
            planets: vec![PlanetView {
                id: capital,
                system: SystemId(empire_id.0 * 100 + 1),
                planet_type: PlanetType::Terran,
                star: StarType::Yellow,
                species: Some(CAPITAL_SPECIES.to_string()),
                population: 15.0,
                target_industry: 15.0,
                target_research: 6.0,
                specials: Vec::new(),
            }],
            species: vec![human_species()],
            fleets: vec![
                FleetView {
                    role: FleetRole::Exploration,
                    ships: 1,
                    troop_pods: 0,
                    has_mission: true,
                },
                FleetView {
                    role: FleetRole::Military,
                    ships: 2,
                    troop_pods: 0,
                    has_mission: false,
                },
            ],
            production: Vec::new(),
            systems: Vec::new(),
            colony_targets: Vec::new(),
            outpost_targets: Vec::new(),
            invasion_targets: Vec::new(),
            unexplored_systems: 4,
            sightings: BTreeMap::new(),
            colony_status: ColonyStatus::default(),
            best_ship: Some(ShipRating {
                rating: 18.0,
                cost: 25.0,
            }),
            troop_ship_pods: Some(2),
            published: BTreeMap::new(),
            reject_orders: None,
            rng: None,
        }
    }

    /// Sandbox with seeded threat and sighting noise
    pub fn with_seed(empire_id: EmpireId, aggression: Aggression, catalog: TechCatalog, seed: u64) -> Self {
        let mut empire = Self::new(empire_id, aggression, catalog);
        empire.rng = Some(ChaCha8Rng::seed_from_u64(seed ^ u64::from(empire_id.0)));
        empire
    }

    /// A fuller starting position: a home system, a gas giant outpost and a
    /// handful of colony and outpost targets
    pub fn demo(empire_id: EmpireId, aggression: Aggression, catalog: TechCatalog, seed: u64) -> Self {
        let mut empire = Self::with_seed(empire_id, aggression, catalog, seed);
        let home = SystemId(empire_id.0 * 100 + 1);
        empire.systems.push(SystemStatus {
            id: home,
            my_fleet_rating: 36.0,
            my_defenses: 10.0,
            ..Default::default()
        });
        empire.add_planet(PlanetView {
            id: PlanetId(empire_id.0 * 100 + 2),
            system: home,
            planet_type: PlanetType::GasGiant,
            star: StarType::Yellow,
            species: None,
            population: 0.0,
            target_industry: 0.0,
            target_research: 0.0,
            specials: Vec::new(),
        });
        for n in 0..4u32 {
            let system = SystemId(empire_id.0 * 100 + 10 + n);
            empire.systems.push(SystemStatus {
                id: system,
                ..Default::default()
            });
            empire.colony_targets.push(ColonyTarget {
                planet: PlanetId(system.0 * 10),
                system,
                score: 90.0 - 10.0 * n as f64,
            });
            empire.outpost_targets.push(ColonyTarget {
                planet: PlanetId(system.0 * 10 + 1),
                system,
                score: 40.0 - 5.0 * n as f64,
            });
        }
        empire
    }

    pub fn add_planet(&mut self, planet: PlanetView) {
        self.planets.push(planet);
    }

    pub fn catalog(&self) -> &TechCatalog {
        &self.catalog
    }

    pub fn queued_techs(&self) -> Vec<TechId> {
        self.queue.iter().map(|item| item.tech.clone()).collect()
    }

    pub fn queue_items(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn is_complete(&self, tech: &TechId) -> bool {
        self.tech_status.get(tech).is_some_and(|s| s.is_complete())
    }

    /// Mark a tech researched without spending points
    pub fn grant_tech(&mut self, tech: &TechId) {
        self.tech_status.insert(tech.clone(), TechStatus::Complete);
        self.queue.retain(|item| &item.tech != tech);
        self.progress.remove(tech);
    }

    fn prerequisites_done(&self, tech: &TechId) -> bool {
        self.catalog.prerequisites(tech).iter().all(|p| self.is_complete(p))
    }

    /// Spend research front-first, each tech capped at `cost / min_turns`
    /// per turn. Fills in allocations and turns-left predictions.
    fn plan_research(&mut self) {
        let mut budget = self.research.unwrap_or(0.0).max(0.0);
        for item in &mut self.queue {
            item.allocation = 0.0;
            item.turns_left = NO_PREDICTION;
        }

        for index in 0..self.queue.len() {
            let tech = self.queue[index].tech.clone();
            let Some(definition) = self.catalog.get(&tech) else {
                continue;
            };
            if !self.prerequisites_done(&tech) {
                continue;
            }
            let spent = self.progress.get(&tech).copied().unwrap_or(0.0);
            let remaining = (definition.cost - spent).max(0.0);
            let per_turn_cap = definition.cost / f64::from(definition.min_turns.max(1));
            let allocation = remaining.min(per_turn_cap).min(budget);
            budget -= allocation;

            let item = &mut self.queue[index];
            item.allocation = allocation;
            if remaining <= COMPLETION_EPSILON {
                item.turns_left = 0;
            } else if allocation > 0.0 {
                item.turns_left = (remaining / allocation).ceil() as i32;
            }
        }
    }

    /// Finish the current turn: research progresses, the economy grows, and
    /// seeded empires get fresh threat readings.
    pub fn advance_turn(&mut self) -> Vec<TechId> {
        self.plan_research();

        let mut completed = Vec::new();
        for item in &self.queue {
            if item.allocation <= 0.0 {
                continue;
            }
            let spent = self.progress.entry(item.tech.clone()).or_insert(0.0);
            *spent += item.allocation;
            let cost = self.catalog.cost(&item.tech).unwrap_or(0.0);
            if *spent + COMPLETION_EPSILON >= cost {
                completed.push(item.tech.clone());
            }
        }
        for tech in &completed {
            self.grant_tech(tech);
        }

        self.turn += 1;
        self.grow(completed.len());
        if self.rng.is_some() {
            self.jitter();
        }
        self.plan_research();

        if !completed.is_empty() {
            debug!(empire = %self.empire_id, turn = self.turn, ?completed, "techs researched");
        }
        completed
    }

    fn grow(&mut self, techs_completed: usize) {
        let boost = techs_completed as f64;
        if let Some(industry) = &mut self.industry {
            *industry = *industry * 1.02 + 0.2 * boost;
        }
        if let Some(research) = &mut self.research {
            *research = *research * 1.02 + 0.3 * boost;
        }
        if let Some(population) = &mut self.population {
            *population += 0.1;
        }
        if let Some(researchers) = &mut self.researchers {
            *researchers += 0.05 + 0.1 * boost;
        }
    }

    fn jitter(&mut self) {
        let Some(rng) = self.rng.as_mut() else {
            return;
        };
        let turn = self.turn;
        let menace = (turn as f64 / 60.0).min(3.0);

        for system in &mut self.systems {
            system.fleet_threat = rng.gen_range(0.0..40.0) * menace;
            system.monster_threat = if rng.gen_bool(0.1) {
                rng.gen_range(50.0..400.0)
            } else {
                0.0
            };
            system.neighbor_threat = rng.gen_range(0.0..20.0) * menace;
            system.max_neighbor_threat = system.neighbor_threat * 0.6;
        }

        if turn > 15 && rng.gen_bool((0.05 * menace).min(0.8)) {
            self.sightings.insert(turn, rng.gen_range(1..5));
        }
        self.colony_status = ColonyStatus {
            under_attack: usize::from(rng.gen_bool(0.05 * menace)),
            under_threat: usize::from(rng.gen_bool(0.1 * menace)),
        };
    }

    fn check_order(&self, tech: &TechId) -> Result<(), CommandError> {
        if let Some(e) = &self.reject_orders {
            return Err(e.clone());
        }
        if !self.catalog.contains(tech) {
            return Err(CommandError::UnknownTech(tech.clone()));
        }
        Ok(())
    }
}

fn human_species() -> SpeciesView {
    SpeciesView {
        name: CAPITAL_SPECIES.to_string(),
        tags: vec!["AVERAGE_INDUSTRY".to_string()],
        can_colonize: true,
        environments: PlanetType::HABITABLE
            .iter()
            .map(|pt| {
                let environment = match pt {
                    PlanetType::Terran | PlanetType::Ocean => PlanetEnvironment::Good,
                    PlanetType::Desert | PlanetType::Tundra | PlanetType::Swamp => PlanetEnvironment::Adequate,
                    PlanetType::Asteroids => PlanetEnvironment::Uninhabitable,
                    _ => PlanetEnvironment::Poor,
                };
                (*pt, environment)
            })
            .collect(),
    }
}

impl GameView for SandboxEmpire {
    fn current_turn(&self) -> Tick {
        self.turn
    }

    fn empire_id(&self) -> EmpireId {
        self.empire_id
    }

    fn aggression(&self) -> Aggression {
        self.aggression
    }

    fn capital(&self) -> Option<PlanetId> {
        self.capital
    }

    fn resource_production(&self, kind: ResourceKind) -> Option<f64> {
        match kind {
            ResourceKind::Industry => self.industry,
            ResourceKind::Research => self.research,
        }
    }

    fn population(&self) -> Option<f64> {
        self.population
    }

    fn researchers(&self) -> Option<f64> {
        self.researchers
    }

    fn owned_planets(&self) -> Vec<PlanetView> {
        self.planets.clone()
    }

    fn fleets(&self) -> Vec<FleetView> {
        self.fleets.clone()
    }

    fn production_queue(&self) -> Vec<ProductionElement> {
        self.production.clone()
    }

    fn research_queue(&self) -> Vec<QueueItem> {
        self.queue.clone()
    }

    fn tech_status(&self, tech: &TechId) -> Option<TechStatus> {
        self.tech_status.get(tech).copied()
    }

    fn species(&self, name: &str) -> Option<SpeciesView> {
        self.species.iter().find(|s| s.name == name).cloned()
    }

    fn system_statuses(&self) -> Vec<SystemStatus> {
        self.systems.clone()
    }

    fn colony_targets(&self) -> Vec<ColonyTarget> {
        self.colony_targets.clone()
    }

    fn outpost_targets(&self) -> Vec<ColonyTarget> {
        self.outpost_targets.clone()
    }

    fn invasion_targets(&self) -> Vec<InvasionTarget> {
        self.invasion_targets.clone()
    }

    fn unexplored_border_systems(&self) -> usize {
        self.unexplored_systems
    }

    fn enemy_sightings(&self) -> BTreeMap<Tick, u32> {
        self.sightings.clone()
    }

    fn colony_status(&self) -> ColonyStatus {
        self.colony_status
    }

    fn best_military_ship(&self) -> Option<ShipRating> {
        self.best_ship
    }

    fn best_troop_ship_pods(&self) -> Option<u32> {
        self.troop_ship_pods
    }
}

impl OrderSink for SandboxEmpire {
    fn enqueue_tech(&mut self, tech: &TechId, index: Option<usize>) -> Result<(), CommandError> {
        self.check_order(tech)?;
        match self.tech_status.get(tech) {
            Some(TechStatus::Complete) => {
                return Err(CommandError::Rejected {
                    reason: format!("{tech} is already researched"),
                })
            }
            Some(TechStatus::Unresearchable) => {
                return Err(CommandError::Rejected {
                    reason: format!("{tech} cannot be researched"),
                })
            }
            _ => {}
        }

        let item = match self.queue.iter().position(|item| &item.tech == tech) {
            Some(current) => self.queue.remove(current),
            None => QueueItem::new(tech.clone()),
        };
        let index = index.unwrap_or(self.queue.len()).min(self.queue.len());
        self.queue.insert(index, item);
        self.plan_research();
        Ok(())
    }

    fn dequeue_tech(&mut self, tech: &TechId) -> Result<(), CommandError> {
        self.check_order(tech)?;
        self.queue.retain(|item| &item.tech != tech);
        self.plan_research();
        Ok(())
    }

    fn set_priority(&mut self, domain: Domain, score: f64) {
        self.published.insert(domain, score);
    }
}
