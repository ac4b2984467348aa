//! Tech catalog and prerequisite graph
//!
//! Static tech content loaded once per run. Prerequisites form a DAG; broken
//! entries (cycles, prerequisites missing from the catalog) are recorded per
//! tech instead of rejecting the whole catalog, so a single bad tech only
//! costs a warning when something tries to queue it.
//! Cycle detection runs on a petgraph graph; prerequisite walks follow the
//! declared prerequisite lists so their order is the declaration order.

use std::fs;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::core::error::{CatalogError, ConfigError};
use crate::core::types::TechId;

/// Research status of a tech for the acting empire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechStatus {
    #[default]
    Researchable,
    Complete,
    Unresearchable,
}

impl TechStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TechStatus::Complete)
    }
}

fn default_min_turns() -> u32 {
    1
}

/// Static definition of one tech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechDefinition {
    pub id: TechId,
    pub cost: f64,
    /// Research cannot finish faster than this many turns
    #[serde(default = "default_min_turns")]
    pub min_turns: u32,
    #[serde(default)]
    pub prerequisites: Vec<TechId>,
    /// Unlocked item names, reporting only
    #[serde(default)]
    pub unlocks: Vec<String>,
}

impl TechDefinition {
    pub fn new(id: &str, cost: f64, prerequisites: &[&str]) -> Self {
        Self {
            id: TechId::from(id),
            cost,
            min_turns: 1,
            prerequisites: prerequisites.iter().map(|p| TechId::from(*p)).collect(),
            unlocks: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tech: Vec<TechDefinition>,
}

/// All known techs plus their prerequisite graph
#[derive(Debug, Clone, Default)]
pub struct TechCatalog {
    techs: AHashMap<TechId, TechDefinition>,
    /// Declaration order, for deterministic iteration
    order: Vec<TechId>,
    /// Edge direction: tech -> prerequisite
    graph: DiGraph<TechId, ()>,
    nodes: AHashMap<TechId, NodeIndex>,
    /// Recursive prerequisites in topological order (deepest first)
    ancestors: AHashMap<TechId, Result<Vec<TechId>, CatalogError>>,
}

impl TechCatalog {
    /// Build the catalog. Duplicate ids are a configuration error; broken
    /// prerequisite chains are not.
    pub fn from_definitions(definitions: Vec<TechDefinition>) -> Result<Self, ConfigError> {
        let mut catalog = TechCatalog::default();

        for definition in definitions {
            if catalog.techs.contains_key(&definition.id) {
                return Err(ConfigError::Invalid(format!(
                    "tech {} is defined twice",
                    definition.id
                )));
            }
            if !(definition.cost.is_finite() && definition.cost >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "tech {} has invalid cost {}",
                    definition.id, definition.cost
                )));
            }
            let idx = catalog.graph.add_node(definition.id.clone());
            catalog.nodes.insert(definition.id.clone(), idx);
            catalog.order.push(definition.id.clone());
            catalog.techs.insert(definition.id.clone(), definition);
        }

        let mut missing: AHashMap<TechId, TechId> = AHashMap::new();
        for id in &catalog.order {
            let tech_idx = catalog.nodes[id];
            for prerequisite in &catalog.techs[id].prerequisites {
                match catalog.nodes.get(prerequisite) {
                    Some(prereq_idx) => {
                        catalog.graph.add_edge(tech_idx, *prereq_idx, ());
                    }
                    None => {
                        missing.insert(id.clone(), prerequisite.clone());
                    }
                }
            }
        }

        let mut cyclic: AHashSet<NodeIndex> = AHashSet::new();
        for component in tarjan_scc(&catalog.graph) {
            let self_loop = component.len() == 1
                && catalog.graph.find_edge(component[0], component[0]).is_some();
            if component.len() > 1 || self_loop {
                cyclic.extend(component);
            }
        }

        let ancestors = catalog
            .order
            .iter()
            .map(|id| (id.clone(), catalog.walk_prerequisites(id, &cyclic, &missing)))
            .collect();
        catalog.ancestors = ancestors;

        Ok(catalog)
    }

    /// Parse a catalog from TOML (`[[tech]]` tables)
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::from_definitions(file.tech)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn walk_prerequisites(
        &self,
        id: &TechId,
        cyclic: &AHashSet<NodeIndex>,
        missing: &AHashMap<TechId, TechId>,
    ) -> Result<Vec<TechId>, CatalogError> {
        let mut seen = AHashSet::new();
        let mut result = Vec::new();
        self.visit_all(id, cyclic, missing, &mut seen, &mut result)?;
        Ok(result)
    }

    /// Post-order walk in declaration order. Cyclic techs are rejected
    /// before their prerequisites are visited, so the recursion only ever
    /// descends through the acyclic part of the graph.
    fn visit_all(
        &self,
        id: &TechId,
        cyclic: &AHashSet<NodeIndex>,
        missing: &AHashMap<TechId, TechId>,
        seen: &mut AHashSet<TechId>,
        result: &mut Vec<TechId>,
    ) -> Result<(), CatalogError> {
        if self.nodes.get(id).is_some_and(|node| cyclic.contains(node)) {
            return Err(CatalogError::CyclicPrerequisite(id.clone()));
        }
        if let Some(prerequisite) = missing.get(id) {
            return Err(CatalogError::MissingPrerequisite {
                tech: id.clone(),
                prerequisite: prerequisite.clone(),
            });
        }

        for prerequisite in self.prerequisites(id) {
            if !seen.insert(prerequisite.clone()) {
                continue;
            }
            self.visit_all(prerequisite, cyclic, missing, seen, result)?;
            result.push(prerequisite.clone());
        }
        Ok(())
    }

    pub fn get(&self, id: &TechId) -> Option<&TechDefinition> {
        self.techs.get(id)
    }

    pub fn contains(&self, id: &TechId) -> bool {
        self.techs.contains_key(id)
    }

    pub fn cost(&self, id: &TechId) -> Option<f64> {
        self.techs.get(id).map(|t| t.cost)
    }

    /// Direct prerequisites (empty for unknown techs)
    pub fn prerequisites(&self, id: &TechId) -> &[TechId] {
        self.techs
            .get(id)
            .map(|t| t.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// All prerequisites, deepest first; every tech appears after its own
    /// prerequisites, and siblings keep their declaration order
    pub fn recursive_prerequisites(&self, id: &TechId) -> Result<&[TechId], CatalogError> {
        match self.ancestors.get(id) {
            Some(Ok(list)) => Ok(list.as_slice()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(CatalogError::UnknownTech(id.clone())),
        }
    }

    /// Prerequisites still standing between `id` and research, deepest
    /// first. The walk stops at complete techs: whatever lies behind a
    /// complete tech no longer blocks anything.
    pub fn unmet_prerequisites(
        &self,
        id: &TechId,
        is_complete: &dyn Fn(&TechId) -> bool,
    ) -> Result<Vec<TechId>, CatalogError> {
        // Surfaces broken chains before walking
        self.recursive_prerequisites(id)?;
        let mut seen = AHashSet::new();
        let mut unmet = Vec::new();
        self.visit_unmet(id, is_complete, &mut seen, &mut unmet);
        Ok(unmet)
    }

    fn visit_unmet(
        &self,
        id: &TechId,
        is_complete: &dyn Fn(&TechId) -> bool,
        seen: &mut AHashSet<TechId>,
        unmet: &mut Vec<TechId>,
    ) {
        for prerequisite in self.prerequisites(id) {
            if is_complete(prerequisite) || !seen.insert(prerequisite.clone()) {
                continue;
            }
            self.visit_unmet(prerequisite, is_complete, seen, unmet);
            unmet.push(prerequisite.clone());
        }
    }

    /// Tech ids in declaration order
    pub fn ids(&self) -> impl Iterator<Item = &TechId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(defs: Vec<TechDefinition>) -> TechCatalog {
        TechCatalog::from_definitions(defs).expect("catalog should build")
    }

    #[test]
    fn test_recursive_prerequisites_are_topological() {
        let catalog = catalog(vec![
            TechDefinition::new("A", 10.0, &[]),
            TechDefinition::new("B", 20.0, &["A"]),
            TechDefinition::new("C", 20.0, &["A"]),
            TechDefinition::new("D", 40.0, &["B", "C"]),
        ]);

        let prereqs = catalog.recursive_prerequisites(&TechId::from("D")).unwrap();
        assert_eq!(prereqs.len(), 3);
        let pos = |id: &str| prereqs.iter().position(|t| t.as_str() == id).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("A") < pos("C"));
        assert!(!prereqs.contains(&TechId::from("D")));
    }

    #[test]
    fn test_prerequisites_follow_declaration_order() {
        let flat = catalog(vec![
            TechDefinition::new("X", 1.0, &[]),
            TechDefinition::new("Y", 1.0, &[]),
            TechDefinition::new("Z", 1.0, &["X", "Y"]),
        ]);
        let prereqs = flat.recursive_prerequisites(&TechId::from("Z")).unwrap();
        assert_eq!(prereqs, &[TechId::from("X"), TechId::from("Y")]);

        // Deeper chains come first, but siblings still keep their order
        let deep = catalog(vec![
            TechDefinition::new("A", 1.0, &[]),
            TechDefinition::new("B", 1.0, &["A"]),
            TechDefinition::new("C", 1.0, &[]),
            TechDefinition::new("D", 1.0, &["C", "B"]),
            TechDefinition::new("E", 1.0, &["D", "A"]),
        ]);
        let names: Vec<&str> = deep
            .recursive_prerequisites(&TechId::from("E"))
            .unwrap()
            .iter()
            .map(|t| t.as_str())
            .collect();
        assert_eq!(names, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_cycle_is_reported_per_tech() {
        let catalog = catalog(vec![
            TechDefinition::new("OK", 1.0, &[]),
            TechDefinition::new("P", 1.0, &["Q"]),
            TechDefinition::new("Q", 1.0, &["P"]),
            TechDefinition::new("R", 1.0, &["Q"]),
        ]);

        assert!(catalog.recursive_prerequisites(&TechId::from("OK")).is_ok());
        assert!(matches!(
            catalog.recursive_prerequisites(&TechId::from("P")),
            Err(CatalogError::CyclicPrerequisite(_))
        ));
        assert!(matches!(
            catalog.recursive_prerequisites(&TechId::from("R")),
            Err(CatalogError::CyclicPrerequisite(_))
        ));
    }

    #[test]
    fn test_missing_prerequisite_is_reported() {
        let catalog = catalog(vec![
            TechDefinition::new("A", 1.0, &["GHOST"]),
            TechDefinition::new("B", 1.0, &["A"]),
        ]);
        let err = catalog.recursive_prerequisites(&TechId::from("B")).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingPrerequisite {
                tech: TechId::from("A"),
                prerequisite: TechId::from("GHOST"),
            }
        );
    }

    #[test]
    fn test_unknown_tech() {
        let catalog = catalog(vec![TechDefinition::new("A", 1.0, &[])]);
        assert!(matches!(
            catalog.recursive_prerequisites(&TechId::from("NOPE")),
            Err(CatalogError::UnknownTech(_))
        ));
    }

    #[test]
    fn test_duplicate_tech_rejected() {
        let result = TechCatalog::from_definitions(vec![
            TechDefinition::new("A", 1.0, &[]),
            TechDefinition::new("A", 2.0, &[]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unmet_prerequisites_stop_at_complete_techs() {
        let catalog = catalog(vec![
            TechDefinition::new("A", 1.0, &[]),
            TechDefinition::new("B", 1.0, &["A"]),
            TechDefinition::new("C", 1.0, &["B"]),
            TechDefinition::new("D", 1.0, &["C", "A"]),
        ]);
        let none = |_: &TechId| false;
        assert_eq!(
            catalog.unmet_prerequisites(&TechId::from("D"), &none).unwrap(),
            vec![TechId::from("A"), TechId::from("B"), TechId::from("C")]
        );

        // B complete: A only blocks D through its direct edge
        let b_done = |t: &TechId| t.as_str() == "B";
        assert_eq!(
            catalog.unmet_prerequisites(&TechId::from("D"), &b_done).unwrap(),
            vec![TechId::from("C"), TechId::from("A")]
        );

        // C complete: nothing behind it matters for D except A
        let c_done = |t: &TechId| t.as_str() == "C";
        assert_eq!(
            catalog.unmet_prerequisites(&TechId::from("D"), &c_done).unwrap(),
            vec![TechId::from("A")]
        );
    }

    #[test]
    fn test_toml_catalog() {
        let catalog = TechCatalog::from_toml_str(
            r#"
            [[tech]]
            id = "A"
            cost = 10.0

            [[tech]]
            id = "B"
            cost = 25.0
            min_turns = 3
            prerequisites = ["A"]
            unlocks = ["BLD_SHIPYARD"]
            "#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&TechId::from("B")).unwrap().min_turns, 3);
        assert_eq!(catalog.prerequisites(&TechId::from("B")), &[TechId::from("A")]);
    }

    #[test]
    fn test_shipped_catalog_is_acyclic() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/techs.toml");
        let catalog = TechCatalog::load(&path).expect("data/techs.toml should load");
        for id in catalog.ids() {
            assert!(
                catalog.recursive_prerequisites(id).is_ok(),
                "{id} has a broken prerequisite chain"
            );
        }
    }
}
