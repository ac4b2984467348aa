//! Game-state collaborator interface
//!
//! Architecture: two narrow traits at the boundary to the game simulation
//! - `GameView` answers read-only queries once per tick (the collector is the
//!   only caller)
//! - `OrderSink` receives the orders the planner issues
//!
//! Queries return `Option` where the game may not know the answer yet; the
//! collector turns `None` into a zero default plus a warning.

pub mod sandbox;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::CommandError;
use crate::core::types::{Aggression, EmpireId, PlanetId, SystemId, TechId, Tick};
use crate::priority::Domain;
use crate::research::catalog::TechStatus;
use crate::research::queue::QueueItem;

pub use sandbox::SandboxEmpire;

/// Resource meters the planner reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Industry,
    Research,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarType {
    Blue,
    White,
    Yellow,
    Orange,
    Red,
    Neutron,
    BlackHole,
    NoStar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetType {
    Swamp,
    Toxic,
    Inferno,
    Radiated,
    Barren,
    Tundra,
    Desert,
    Terran,
    Ocean,
    Asteroids,
    GasGiant,
}

impl PlanetType {
    /// Planet types a species can live on, in environment-table order
    pub const HABITABLE: [PlanetType; 10] = [
        PlanetType::Swamp,
        PlanetType::Radiated,
        PlanetType::Toxic,
        PlanetType::Inferno,
        PlanetType::Barren,
        PlanetType::Tundra,
        PlanetType::Desert,
        PlanetType::Terran,
        PlanetType::Ocean,
        PlanetType::Asteroids,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetEnvironment {
    Uninhabitable,
    Hostile,
    Poor,
    Adequate,
    Good,
}

/// An owned planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetView {
    pub id: PlanetId,
    pub system: SystemId,
    pub planet_type: PlanetType,
    pub star: StarType,
    pub species: Option<String>,
    pub population: f64,
    pub target_industry: f64,
    pub target_research: f64,
    pub specials: Vec<String>,
}

/// Mission role of an owned fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FleetRole {
    Exploration,
    Military,
    Colonisation,
    Outpost,
    Invasion,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetView {
    pub role: FleetRole,
    pub ships: u32,
    pub troop_pods: u32,
    /// Already assigned to a target (colony/outpost fleets with a mission are
    /// not counted as available)
    pub has_mission: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Ship,
    Building,
}

/// Ship role of a queued design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipRole {
    Scout,
    Warship,
    Troopship,
    TroopBase,
    ColonyShip,
    OutpostShip,
    Other,
}

/// One production-queue element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionElement {
    pub build_type: BuildType,
    pub role: ShipRole,
    pub remaining: u32,
    pub block_size: u32,
    /// Troop pod parts per ship of this design
    pub troop_pods: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesView {
    pub name: String,
    pub tags: Vec<String>,
    pub can_colonize: bool,
    pub environments: Vec<(PlanetType, PlanetEnvironment)>,
}

impl SpeciesView {
    pub fn environment(&self, planet_type: PlanetType) -> PlanetEnvironment {
        self.environments
            .iter()
            .find(|(pt, _)| *pt == planet_type)
            .map(|(_, env)| *env)
            .unwrap_or(PlanetEnvironment::Uninhabitable)
    }
}

/// Threat and defense ratings of one system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemStatus {
    pub id: SystemId,
    pub my_fleet_rating: f64,
    pub my_defenses: f64,
    pub fleet_threat: f64,
    pub monster_threat: f64,
    pub planet_threat: f64,
    pub neighbor_threat: f64,
    pub max_neighbor_threat: f64,
}

/// A planet the colonisation module considers worth claiming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyTarget {
    pub planet: PlanetId,
    pub system: SystemId,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvasionTarget {
    pub planet: PlanetId,
    pub system: SystemId,
    pub score: f64,
    /// Defending troops
    pub troops: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShipRating {
    pub rating: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ColonyStatus {
    pub under_attack: usize,
    pub under_threat: usize,
}

/// Read-only queries against the game state
pub trait GameView {
    fn current_turn(&self) -> Tick;
    fn empire_id(&self) -> EmpireId;
    fn aggression(&self) -> Aggression;
    fn capital(&self) -> Option<PlanetId>;
    fn resource_production(&self, kind: ResourceKind) -> Option<f64>;
    fn population(&self) -> Option<f64>;
    fn researchers(&self) -> Option<f64>;
    fn owned_planets(&self) -> Vec<PlanetView>;
    fn fleets(&self) -> Vec<FleetView>;
    fn production_queue(&self) -> Vec<ProductionElement>;
    fn research_queue(&self) -> Vec<QueueItem>;
    fn tech_status(&self, tech: &TechId) -> Option<TechStatus>;
    fn species(&self, name: &str) -> Option<SpeciesView>;
    fn system_statuses(&self) -> Vec<SystemStatus>;
    fn colony_targets(&self) -> Vec<ColonyTarget>;
    fn outpost_targets(&self) -> Vec<ColonyTarget>;
    fn invasion_targets(&self) -> Vec<InvasionTarget>;
    fn unexplored_border_systems(&self) -> usize;
    fn enemy_sightings(&self) -> BTreeMap<Tick, u32>;
    fn colony_status(&self) -> ColonyStatus;
    fn best_military_ship(&self) -> Option<ShipRating>;
    /// Troop pods on the best available troop ship design
    fn best_troop_ship_pods(&self) -> Option<u32>;
}

/// Orders issued back to the game
pub trait OrderSink {
    /// Place `tech` at `index` (moving it if already queued); `None` appends
    fn enqueue_tech(&mut self, tech: &TechId, index: Option<usize>) -> Result<(), CommandError>;
    fn dequeue_tech(&mut self, tech: &TechId) -> Result<(), CommandError>;
    /// One-way publish read by the production collaborators
    fn set_priority(&mut self, domain: Domain, score: f64);
}
