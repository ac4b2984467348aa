//! Planner configuration with documented coefficient tables
//!
//! Every tuning number used by the score engine and the queue scheduler lives
//! here. The tables are loaded once per run (TOML) and never change while the
//! run is in progress. `validate` rejects tables the scoring math cannot use;
//! a rejected config is fatal before the first tick.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, Result};
use crate::core::types::{Aggression, TechId, Tick};
use crate::priority::Domain;
use crate::research::acceleration::{AccelerationRule, ChainLink, Condition, EmpireTag, SlotAnchor, TargetSlot};
use crate::research::pruning::{FollowUp, PruneRule};
use crate::style::{PRIORITY_STYLE_COUNT, RESEARCH_INDEX_COUNT};

/// Complete planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub production: ProductionConfig,
    pub styles: StyleTables,
    pub research_curve: ResearchCurveConfig,
    pub exploration: ExplorationConfig,
    pub colonization: ColonizationConfig,
    pub outpost: OutpostConfig,
    pub invasion: InvasionConfig,
    pub military: MilitaryConfig,
    pub categories: CategoryConfig,
    pub queue: QueueConfig,
}

/// Fixed production baseline every other domain scales against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    pub base: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self { base: 50.0 }
    }
}

/// Per-style research regime tables, indexed by priority style index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTables {
    /// Turn cutoffs separating the five research regimes
    pub research_cutoffs: Vec<[Tick; 4]>,
    /// Research multiplier of the production baseline per regime
    pub research_settings: Vec<[f64; 5]>,
}

impl Default for StyleTables {
    fn default() -> Self {
        Self {
            research_cutoffs: vec![[25, 45, 70, 110], [30, 45, 70, 150], [25, 45, 80, 160]],
            research_settings: vec![
                [1.4, 0.7, 0.5, 0.4, 0.35],
                [1.5, 0.7, 0.6, 0.5, 0.35],
                [1.6, 0.8, 0.7, 0.6, 0.5],
            ],
        }
    }
}

/// Conditions that temporarily trade research for industry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustrySurgeConfig {
    /// Surge only for empires strictly more aggressive than this
    pub above_aggression: Aggression,
    /// Weight of research output when comparing combined output to the cap
    pub research_weight: f64,
    /// Combined output cap, per aggression level
    pub output_per_aggression: f64,
    /// Orbital generation counts as available when queued within this many slots
    pub queue_window: usize,
    /// No surge once the empire has this many colonies
    pub colony_cap: usize,
    pub factor: f64,
}

impl Default for IndustrySurgeConfig {
    fn default() -> Self {
        Self {
            above_aggression: Aggression::Cautious,
            research_weight: 1.6,
            output_per_aggression: 60.0,
            queue_window: 3,
            colony_cap: 8,
            factor: 0.5,
        }
    }
}

/// Research priority curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchCurveConfig {
    /// Early research booster; research stays at the opening level until done
    pub booster_tech: TechId,
    /// Orbital generation tech; also gates the industry surge
    pub orbital_gen_tech: TechId,
    /// Research network tech granting the late bonus
    pub network_tech: TechId,

    /// Queue length below which the "few left" taper applies
    pub few_items_limit: usize,
    /// Queue length below which the "some left" taper applies
    pub some_items_limit: usize,
    /// Queue length below which the half-point taper applies
    pub half_items_limit: usize,
    /// Unit of the taper formulas, as a fraction of the production baseline
    pub taper_unit: f64,
    pub some_items_base: f64,
    pub some_items_step: f64,
    pub half_point_factor: f64,

    pub surge: IndustrySurgeConfig,

    pub network_bonus: f64,
    pub network_cap: f64,

    /// Few enemy sightings so far: research more
    pub sparse_sightings_base: f64,
    pub sparse_sightings_turns: f64,
    pub sparse_factor: f64,

    /// Many recent sightings: research less
    pub hostile_after_turn: Tick,
    pub recent_window: Tick,
    pub recent_threshold: usize,
    pub hostile_factor: f64,
}

impl Default for ResearchCurveConfig {
    fn default() -> Self {
        Self {
            booster_tech: TechId::from("LRN_ALGO_ELEGANCE"),
            orbital_gen_tech: TechId::from("PRO_ORBITAL_GEN"),
            network_tech: TechId::from("LRN_QUANT_NET"),
            few_items_limit: 5,
            some_items_limit: 10,
            half_items_limit: 20,
            taper_unit: 0.01,
            some_items_base: 4.0,
            some_items_step: 2.0,
            half_point_factor: 0.7,
            surge: IndustrySurgeConfig::default(),
            network_bonus: 0.1,
            network_cap: 1.3,
            sparse_sightings_base: 2.0,
            sparse_sightings_turns: 20.0,
            sparse_factor: 1.2,
            hostile_after_turn: 20,
            recent_window: 8,
            recent_threshold: 2,
            hostile_factor: 0.6,
        }
    }
}

/// Scout demand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub base_scouts: f64,
    pub military_ships_per_scout: u32,
    pub turns_per_scout: Tick,
    pub unexplored_base: f64,
    pub weight: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            base_scouts: 4.0,
            military_ships_per_scout: 5,
            turns_per_scout: 50,
            unexplored_base: 2.0,
            weight: 40.0,
        }
    }
}

/// Colony ship demand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonizationConfig {
    /// Share of production allotted to colonization:
    /// `[enemies sighted][empire id parity]`
    pub portion: [[f64; 2]; 2],
    /// Prior-tick military priority thresholds boosting the portion
    pub military_low: f64,
    pub military_low_factor: f64,
    pub military_mid: f64,
    pub military_mid_factor: f64,
    /// Late-game decay of the portion as the colony count grows
    pub late_turn: Tick,
    pub late_decay: f64,
    pub late_decay_colonies: f64,

    pub base_cost: f64,
    pub cost_per_colony: f64,
    pub turns_to_build: f64,
    pub min_target_score: f64,
    /// Extra targets considered beyond the allotted count
    pub target_margin: usize,
    pub weight: f64,

    /// Growth barrier: `base + (offset + aggression)^2 * turn / turns`
    pub barrier_base: f64,
    pub barrier_aggression_offset: f64,
    pub barrier_turns: f64,
}

impl Default for ColonizationConfig {
    fn default() -> Self {
        Self {
            portion: [[0.3, 0.4], [0.6, 0.9]],
            military_low: 100.0,
            military_low_factor: 2.0,
            military_mid: 200.0,
            military_mid_factor: 1.5,
            late_turn: 100,
            late_decay: 0.75,
            late_decay_colonies: 10.0,
            base_cost: 120.0,
            cost_per_colony: 0.06,
            turns_to_build: 8.0,
            min_target_score: 60.0,
            target_margin: 2,
            weight: 60.0,
            barrier_base: 2.0,
            barrier_aggression_offset: 0.5,
            barrier_turns: 50.0,
        }
    }
}

/// Outpost ship demand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutpostConfig {
    /// Outposts are impossible before this tech
    pub gate_tech: TechId,
    pub base_cost: f64,
    /// Targets must score above `base_cost / score_divisor`
    pub score_divisor: f64,
    pub weight: f64,
}

impl Default for OutpostConfig {
    fn default() -> Self {
        Self {
            gate_tech: TechId::from("CON_ENV_ENCAPSUL"),
            base_cost: 80.0,
            score_divisor: 3.0,
            weight: 50.0,
        }
    }
}

/// Troop ship demand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvasionConfig {
    pub turns_per_target: Tick,
    /// Beginner empires do not invade before this turn
    pub beginner_until_turn: Tick,
    pub troops_per_pod: f64,
    /// Extra troops planned per target on top of its garrison
    pub troop_margin: f64,
    pub min_colony_score: f64,
    pub base: f64,
    pub per_ship: f64,
    pub safe_factor: f64,
    pub threatened_factor: f64,
    pub unsighted_factor: f64,
    pub beginner_factor: f64,
}

impl Default for InvasionConfig {
    fn default() -> Self {
        Self {
            turns_per_target: 25,
            beginner_until_turn: 150,
            troops_per_pod: 2.0,
            troop_margin: 4.0,
            min_colony_score: 2.0,
            base: 30.0,
            per_ship: 150.0,
            safe_factor: 2.0,
            threatened_factor: 1.5,
            unsighted_factor: 1.5,
            beginner_factor: 0.5,
        }
    }
}

/// Turn-dependent damping of monster threat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterScaling {
    /// Up to this turn, monsters above `early_cap` are ignored
    pub early_turn: Tick,
    pub early_cap: f64,
    /// Up to this turn, monsters at or above `big_monster` are ignored
    pub mid_turn: Tick,
    pub big_monster: f64,
    /// Up to this turn, big monsters are phased in; afterwards counted fully
    pub late_turn: Tick,
}

impl Default for MonsterScaling {
    fn default() -> Self {
        Self {
            early_turn: 30,
            early_cap: 200.0,
            mid_turn: 100,
            big_monster: 2000.0,
            late_turn: 200,
        }
    }
}

/// Warship demand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MilitaryConfig {
    /// Turn-number floor term: `min(turn, floor_cap)`
    pub floor_cap: f64,
    pub per_ship: f64,
    pub max_neighbor_weight: f64,
    pub neighbor_weight: f64,
    pub monster: MonsterScaling,
    /// Any of these complete counts as having basic weapons
    pub basic_weapon_techs: Vec<TechId>,
    /// Any of these complete counts as having advanced weapons
    pub advanced_weapon_techs: Vec<TechId>,
    pub no_weapons_divisor: f64,
    pub no_advanced_divisor: f64,
}

impl Default for MilitaryConfig {
    fn default() -> Self {
        Self {
            floor_cap: 40.0,
            per_ship: 75.0,
            max_neighbor_weight: 0.8,
            neighbor_weight: 0.2,
            monster: MonsterScaling::default(),
            basic_weapon_techs: techs(&["SHP_WEAPON_1_4", "SHP_WEAPON_2_1", "SHP_WEAPON_4_1"]),
            advanced_weapon_techs: techs(&["SHP_WEAPON_2_3", "SHP_WEAPON_4_1"]),
            no_weapons_divisor: 2.0,
            no_advanced_divisor: 1.5,
        }
    }
}

/// A research sub-priority that is fixed or zero depending on the top
/// production domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGate {
    pub domain: Domain,
    pub when_top: Vec<Domain>,
    pub value: f64,
    pub otherwise: f64,
}

/// Research sub-category priorities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Learning priority on the very first turn (zero afterwards)
    pub learning_first_turn: f64,
    /// Domains competing for the top production slot
    pub production_domains: Vec<Domain>,
    pub gates: Vec<CategoryGate>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            learning_first_turn: 100.0,
            production_domains: vec![
                Domain::Exploration,
                Domain::Colonization,
                Domain::Outpost,
                Domain::Invasion,
                Domain::Military,
            ],
            gates: vec![
                CategoryGate {
                    domain: Domain::Growth,
                    when_top: vec![Domain::Colonization],
                    value: 70.0,
                    otherwise: 0.0,
                },
                CategoryGate {
                    domain: Domain::ProductionTech,
                    when_top: vec![Domain::Outpost, Domain::Invasion],
                    value: 60.0,
                    otherwise: 0.0,
                },
                CategoryGate {
                    domain: Domain::Construction,
                    when_top: vec![Domain::Exploration, Domain::Military],
                    value: 80.0,
                    otherwise: 30.0,
                },
                CategoryGate {
                    domain: Domain::Ships,
                    when_top: vec![Domain::Military],
                    value: 90.0,
                    otherwise: 0.0,
                },
            ],
        }
    }
}

/// Research queue scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Seeding also runs before this turn whenever the queue is empty
    pub seeding_turn_limit: Tick,
    /// Priority tech lists, indexed by research index
    pub seed_lists: Vec<Vec<TechId>>,
    /// Fast-tracked for empires at or below `defensive_aggression`
    pub defense_techs: Vec<TechId>,
    pub defensive_aggression: Aggression,
    pub defense_slot: usize,
    pub defense_window: usize,
    /// Never added by the top-up pass
    pub excluded_techs: Vec<TechId>,
    /// Top-up runs every turn after this one
    pub top_up_after_turn: Tick,
    /// Leading slots never displaced by acceleration
    pub accelerate_floor: usize,
    /// Turns-left predictions are read from this many leading items
    pub turns_left_horizon: usize,
    pub rules: Vec<AccelerationRule>,
    pub prune_rules: Vec<PruneRule>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            seeding_turn_limit: 5,
            seed_lists: default_seed_lists(),
            defense_techs: techs(&["DEF_DEFENSE_NET_1", "DEF_GARRISON_1"]),
            defensive_aggression: Aggression::Cautious,
            defense_slot: 3,
            defense_window: 5,
            excluded_techs: Vec::new(),
            top_up_after_turn: 100,
            accelerate_floor: 1,
            turns_left_horizon: 10,
            rules: default_acceleration_rules(),
            prune_rules: vec![PruneRule {
                name: "death_ray_cleanup".to_string(),
                trigger: TechId::from("SHP_WEAPON_4_1"),
                keep: 2,
                follow_up: Some(FollowUp {
                    tech: TechId::from("SHP_WEAPON_4_2"),
                    back_off: 15,
                }),
            }],
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML config
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let styles = &self.styles;
        if styles.research_cutoffs.len() != styles.research_settings.len() {
            return invalid(format!(
                "research_cutoffs has {} style tables but research_settings has {}",
                styles.research_cutoffs.len(),
                styles.research_settings.len()
            ));
        }
        if styles.research_cutoffs.len() < PRIORITY_STYLE_COUNT {
            return Err(ConfigError::StyleIndexOutOfRange {
                index: PRIORITY_STYLE_COUNT - 1,
                available: styles.research_cutoffs.len(),
            });
        }
        for (index, cutoffs) in styles.research_cutoffs.iter().enumerate() {
            if cutoffs.windows(2).any(|w| w[0] >= w[1]) {
                return invalid(format!("research_cutoffs[{index}] must be strictly ascending"));
            }
        }
        for (index, settings) in styles.research_settings.iter().enumerate() {
            if settings.iter().any(|s| !is_factor(*s)) {
                return invalid(format!("research_settings[{index}] must be non-negative"));
            }
        }

        if self.queue.seed_lists.len() < RESEARCH_INDEX_COUNT {
            return Err(ConfigError::StyleIndexOutOfRange {
                index: RESEARCH_INDEX_COUNT - 1,
                available: self.queue.seed_lists.len(),
            });
        }

        let factors = [
            ("production.base", self.production.base),
            ("research_curve.taper_unit", self.research_curve.taper_unit),
            ("research_curve.half_point_factor", self.research_curve.half_point_factor),
            ("research_curve.surge.factor", self.research_curve.surge.factor),
            ("research_curve.network_bonus", self.research_curve.network_bonus),
            ("research_curve.network_cap", self.research_curve.network_cap),
            ("research_curve.sparse_factor", self.research_curve.sparse_factor),
            ("research_curve.hostile_factor", self.research_curve.hostile_factor),
            ("exploration.weight", self.exploration.weight),
            ("colonization.weight", self.colonization.weight),
            ("colonization.late_decay", self.colonization.late_decay),
            ("outpost.weight", self.outpost.weight),
            ("invasion.per_ship", self.invasion.per_ship),
            ("military.floor_cap", self.military.floor_cap),
            ("military.per_ship", self.military.per_ship),
        ];
        for (name, value) in factors {
            if !is_factor(value) {
                return invalid(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        for row in &self.colonization.portion {
            if row.iter().any(|p| !is_factor(*p)) {
                return invalid("colonization.portion entries must be non-negative".to_string());
            }
        }

        let divisors = [
            ("colonization.base_cost", self.colonization.base_cost),
            ("outpost.base_cost", self.outpost.base_cost),
            ("outpost.score_divisor", self.outpost.score_divisor),
            ("invasion.troops_per_pod", self.invasion.troops_per_pod),
            ("military.no_weapons_divisor", self.military.no_weapons_divisor),
            ("military.no_advanced_divisor", self.military.no_advanced_divisor),
            ("colonization.barrier_turns", self.colonization.barrier_turns),
            ("research_curve.sparse_sightings_turns", self.research_curve.sparse_sightings_turns),
        ];
        for (name, value) in divisors {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }
        if self.exploration.military_ships_per_scout == 0
            || self.exploration.turns_per_scout == 0
            || self.invasion.turns_per_target == 0
        {
            return invalid("exploration and invasion divisors must be positive".to_string());
        }

        for gate in &self.categories.gates {
            if !is_factor(gate.value) || !is_factor(gate.otherwise) {
                return invalid(format!("category gate for {:?} must be non-negative", gate.domain));
            }
        }

        for rule in &self.queue.rules {
            rule.validate().map_err(ConfigError::Invalid)?;
        }
        for rule in &self.queue.prune_rules {
            if rule.name.is_empty() {
                return invalid("prune rules need a name".to_string());
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> Result<()> {
    Err(ConfigError::Invalid(message))
}

fn is_factor(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn techs(ids: &[&str]) -> Vec<TechId> {
    ids.iter().map(|id| TechId::from(*id)).collect()
}

fn default_seed_lists() -> Vec<Vec<TechId>> {
    let opening = [
        "LRN_ALGO_ELEGANCE",
        "GRO_PLANET_ECOL",
        "GRO_GENETIC_ENG",
        "LRN_PHYS_BRAIN",
        "PRO_ROBOTIC_PROD",
    ];
    let tails: [&[&str]; RESEARCH_INDEX_COUNT] = [
        &["GRO_SUBTER_HAB", "LRN_NASCENT_AI", "GRO_SYMBIOTIC_BIO", "PRO_FUSION_GEN", "CON_ORBITAL_CON"],
        &["PRO_FUSION_GEN", "GRO_SYMBIOTIC_BIO", "PRO_EXOBOTS", "LRN_NASCENT_AI", "CON_ENV_ENCAPSUL"],
        &["PRO_FUSION_GEN", "SHP_ZORTRIUM_PLATE", "GRO_SYMBIOTIC_BIO", "PRO_EXOBOTS", "SHP_WEAPON_1_2"],
        &["SHP_WEAPON_1_2", "PRO_FUSION_GEN", "SHP_ZORTRIUM_PLATE", "SHP_MIL_ROBO_CONT", "GRO_SYMBIOTIC_BIO"],
        &["SHP_ZORTRIUM_PLATE", "SHP_WEAPON_1_2", "SHP_WEAPON_1_3", "PRO_FUSION_GEN", "PRO_ORBITAL_GEN"],
    ];
    tails
        .iter()
        .map(|tail| {
            let mut list = techs(&opening);
            list.extend(techs(tail));
            list
        })
        .collect()
}

/// Growth and production chain run while no enemies have been seen
const ECONOMY_CHAIN: &str = "economy";

fn chain_rule(name: &str, tech: &str, gate: &str, anchor: &str, add: &[&str]) -> AccelerationRule {
    AccelerationRule {
        name: name.to_string(),
        chain: Some(ChainLink {
            group: ECONOMY_CHAIN.to_string(),
            until: TechId::from(tech),
        }),
        conditions: vec![
            Condition::NoEnemiesSighted,
            Condition::GateTurnsLeft {
                tech: TechId::from(gate),
                within: vec![0, 1, 2],
            },
        ],
        target: TargetSlot::Anchored {
            anchors: vec![SlotAnchor {
                tech: TechId::from(anchor),
                offset: 1,
            }],
        },
        guard: None,
        techs: techs(add),
        lookahead: 1,
    }
}

fn default_acceleration_rules() -> Vec<AccelerationRule> {
    vec![
        AccelerationRule {
            name: "ancient_ruins".to_string(),
            chain: None,
            conditions: vec![
                Condition::HasTag { tag: EmpireTag::AncientRuins },
                Condition::TechNotComplete { tech: TechId::from("LRN_XENOARCH") },
                Condition::AggressionAtLeast { level: Aggression::Typical },
            ],
            target: TargetSlot::Anchored {
                anchors: vec![
                    SlotAnchor { tech: TechId::from("LRN_ARTIF_MINDS"), offset: 7 },
                    SlotAnchor { tech: TechId::from("GRO_SYMBIOTIC_BIO"), offset: 1 },
                ],
            },
            guard: Some(TechId::from("LRN_XENOARCH")),
            techs: techs(&["LRN_ALGO_ELEGANCE", "LRN_PHYS_BRAIN", "LRN_TRANSLING_THT", "LRN_XENOARCH"]),
            lookahead: 4,
        },
        chain_rule(
            "xeno_genetics_after_exobots",
            "GRO_XENO_GENETICS",
            "PRO_EXOBOTS",
            "PRO_EXOBOTS",
            &["GRO_GENETIC_MED", "GRO_XENO_GENETICS"],
        ),
        chain_rule(
            "exobots_after_sentient_automation",
            "PRO_EXOBOTS",
            "PRO_SENTIENT_AUTOMATION",
            "PRO_SENTIENT_AUTOMATION",
            &["PRO_EXOBOTS"],
        ),
        chain_rule(
            "sentient_automation_after_nanotech",
            "PRO_SENTIENT_AUTOMATION",
            "PRO_NANOTECH_PROD",
            "PRO_NANOTECH_PROD",
            &["PRO_SENTIENT_AUTOMATION"],
        ),
        chain_rule(
            "industry_center_after_symbiosis",
            "PRO_INDUSTRY_CENTER_I",
            "GRO_SYMBIOTIC_BIO",
            "GRO_SYMBIOTIC_BIO",
            &["PRO_ROBOTIC_PROD", "PRO_FUSION_GEN", "PRO_INDUSTRY_CENTER_I"],
        ),
        chain_rule(
            "symbiosis_after_armor",
            "GRO_SYMBIOTIC_BIO",
            "SHP_ORG_HULL",
            "SHP_ZORTRIUM_PLATE",
            &["GRO_SYMBIOTIC_BIO"],
        ),
        AccelerationRule {
            name: "asteroid_hulls".to_string(),
            chain: None,
            conditions: vec![
                Condition::HasTag { tag: EmpireTag::AsteroidBelt },
                Condition::TechNotComplete { tech: TechId::from("SHP_ASTEROID_HULLS") },
            ],
            target: TargetSlot::Anchored {
                anchors: vec![SlotAnchor { tech: TechId::from("GRO_SYMBIOTIC_BIO"), offset: 1 }],
            },
            guard: None,
            techs: techs(&["PRO_MICROGRAV_MAN", "SHP_ASTEROID_HULLS"]),
            lookahead: 2,
        },
        AccelerationRule {
            name: "gas_giant_generator".to_string(),
            chain: None,
            conditions: vec![
                Condition::HasTag { tag: EmpireTag::GasGiant },
                Condition::TechNotComplete { tech: TechId::from("PRO_ORBITAL_GEN") },
            ],
            target: TargetSlot::Anchored {
                anchors: vec![SlotAnchor { tech: TechId::from("GRO_SYMBIOTIC_BIO"), offset: 1 }],
            },
            guard: None,
            techs: techs(&["PRO_ORBITAL_GEN"]),
            lookahead: 3,
        },
        AccelerationRule {
            name: "poor_colonizers".to_string(),
            chain: None,
            conditions: vec![
                Condition::TechComplete { tech: TechId::from("PRO_ORBITAL_GEN") },
                Condition::TechComplete { tech: TechId::from("GRO_SYMBIOTIC_BIO") },
                Condition::TechNotComplete { tech: TechId::from("GRO_XENO_GENETICS") },
                Condition::AggressionAtLeast { level: Aggression::Cautious },
                Condition::NoAdequateColonizer,
            ],
            target: TargetSlot::Cursor,
            guard: None,
            techs: techs(&["GRO_GENETIC_ENG", "GRO_XENO_GENETICS"]),
            lookahead: 1,
        },
        AccelerationRule {
            name: "distributed_thought".to_string(),
            chain: None,
            conditions: vec![
                Condition::TechNotComplete { tech: TechId::from("LRN_DISTRIB_THOUGHT") },
                Condition::AggressionAbove { level: Aggression::Cautious },
                Condition::AnyOf {
                    conditions: vec![
                        Condition::PopulationAbove { population: 300.0 },
                        Condition::AllOf {
                            conditions: vec![
                                Condition::HasTag { tag: EmpireTag::Telepathic },
                                Condition::PopulationAbove { population: 100.0 },
                            ],
                        },
                    ],
                },
            ],
            target: TargetSlot::Cursor,
            guard: None,
            techs: techs(&["LRN_PHYS_BRAIN", "LRN_TRANSLING_THT", "LRN_PSIONICS", "LRN_DISTRIB_THOUGHT"]),
            lookahead: 4,
        },
        AccelerationRule {
            name: "quantum_network".to_string(),
            chain: None,
            conditions: vec![
                Condition::AggressionAbove { level: Aggression::Cautious },
                Condition::ResearchersAtLeast { researchers: 40.0 },
                Condition::TechNotComplete { tech: TechId::from("LRN_QUANT_NET") },
            ],
            target: TargetSlot::Cursor,
            guard: None,
            techs: techs(&["LRN_NDIM_SUBSPACE", "LRN_QUANT_NET"]),
            lookahead: 2,
        },
        AccelerationRule {
            name: "black_hole_generator".to_string(),
            chain: None,
            conditions: vec![
                Condition::TurnAfter { turn: 50 },
                Condition::HasTag { tag: EmpireTag::BlackHole },
                Condition::AggressionAbove { level: Aggression::Cautious },
                Condition::TechNotComplete { tech: TechId::from("PRO_SINGULAR_GEN") },
            ],
            target: TargetSlot::Cursor,
            guard: None,
            techs: techs(&["PRO_SINGULAR_GEN"]),
            lookahead: 1,
        },
    ]
}
