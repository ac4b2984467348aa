//! Property tests for queue editing and domain scoring

use ahash::{AHashMap, AHashSet};
use proptest::prelude::*;
use proptest::sample::Index;

use empire_ai::core::types::{Aggression, EmpireId, TechId};
use empire_ai::core::PlannerConfig;
use empire_ai::priority::{Domain, PriorityEngine, PriorityState};
use empire_ai::research::queue::QueueEditor;
use empire_ai::research::seeding::seed;
use empire_ai::research::{ResearchQueue, TechCatalog, TechDefinition, TechStatus};
use empire_ai::snapshot::{FleetCounts, WorldSnapshot};
use empire_ai::style::coefficients_for;

#[derive(Debug, Clone)]
enum Op {
    Place(Index, usize),
    Append(Index),
    Seed(Vec<Index>),
    Dequeue(Index),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<Index>(), 0usize..16).prop_map(|(t, at)| Op::Place(t, at)),
        any::<Index>().prop_map(Op::Append),
        prop::collection::vec(any::<Index>(), 1..5).prop_map(Op::Seed),
        any::<Index>().prop_map(Op::Dequeue),
    ]
}

fn name(i: usize) -> String {
    format!("T{i}")
}

/// A random tech DAG: every prerequisite points at a lower index
fn catalog_and_status() -> impl Strategy<Value = (TechCatalog, AHashMap<TechId, TechStatus>)> {
    (3usize..12)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(any::<Index>(), 0..3), n),
                prop::collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(edges, done)| {
            let mut definitions = Vec::new();
            let mut complete = vec![false; edges.len()];
            for (i, picks) in edges.iter().enumerate() {
                let mut prerequisites: Vec<usize> = if i == 0 {
                    Vec::new()
                } else {
                    picks.iter().map(|p| p.index(i)).collect()
                };
                prerequisites.sort_unstable();
                prerequisites.dedup();

                // A tech is only complete when everything it needs is
                complete[i] = done[i] && prerequisites.iter().all(|&p| complete[p]);

                let names: Vec<String> = prerequisites.iter().map(|&p| name(p)).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                definitions.push(TechDefinition::new(&name(i), 10.0 + i as f64, &refs));
            }

            let status = complete
                .iter()
                .enumerate()
                .filter(|(_, done)| **done)
                .map(|(i, _)| (TechId::from(name(i).as_str()), TechStatus::Complete))
                .collect();
            let catalog = TechCatalog::from_definitions(definitions).expect("generated DAG is valid");
            (catalog, status)
        })
}

fn pick(catalog: &TechCatalog, index: &Index) -> TechId {
    TechId::from(name(index.index(catalog.len())).as_str())
}

fn check_order(queue: &ResearchQueue, catalog: &TechCatalog, snapshot: &WorldSnapshot) -> Result<(), TestCaseError> {
    let techs: Vec<&TechId> = queue.techs().collect();
    let unique: AHashSet<&TechId> = techs.iter().copied().collect();
    prop_assert_eq!(unique.len(), techs.len(), "duplicate in {:?}", techs);

    for (index, tech) in techs.iter().enumerate() {
        let unmet = catalog
            .unmet_prerequisites(tech, &|t: &TechId| snapshot.is_complete(t))
            .expect("generated DAG is valid");
        for prerequisite in &unmet {
            if let Some(position) = queue.position(prerequisite) {
                prop_assert!(
                    position < index,
                    "{} at {} ahead of {} at {}",
                    tech,
                    index,
                    prerequisite,
                    position
                );
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_edits_keep_prerequisite_order(
        (catalog, status) in catalog_and_status(),
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let snapshot = WorldSnapshot { tech_status: status, ..Default::default() };
        let mut queue = ResearchQueue::new();

        for op in &ops {
            let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);
            match op {
                Op::Place(t, at) => {
                    editor.place(&pick(&catalog, t), *at);
                }
                Op::Append(t) => {
                    editor.append(&pick(&catalog, t));
                }
                Op::Seed(list) => {
                    let list: Vec<TechId> = list.iter().map(|t| pick(&catalog, t)).collect();
                    seed(&mut editor, &list);
                }
                Op::Dequeue(t) => {
                    editor.dequeue(&pick(&catalog, t));
                }
            }
            drop(editor);
            check_order(&queue, &catalog, &snapshot)?;
        }
    }

    #[test]
    fn test_seeding_queues_every_unmet_prerequisite(
        (catalog, status) in catalog_and_status(),
        lists in prop::collection::vec(prop::collection::vec(any::<Index>(), 1..6), 1..4),
    ) {
        let snapshot = WorldSnapshot { tech_status: status, ..Default::default() };
        let mut queue = ResearchQueue::new();
        let mut seeded = Vec::new();

        for list in &lists {
            let list: Vec<TechId> = list.iter().map(|t| pick(&catalog, t)).collect();
            let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);
            seed(&mut editor, &list);
            seeded.extend(list);
        }

        check_order(&queue, &catalog, &snapshot)?;
        for tech in queue.techs() {
            let unmet = catalog
                .unmet_prerequisites(tech, &|t: &TechId| snapshot.is_complete(t))
                .expect("generated DAG is valid");
            for prerequisite in unmet {
                prop_assert!(queue.contains(&prerequisite), "{} missing for {}", prerequisite, tech);
            }
        }
        for tech in &seeded {
            prop_assert_eq!(snapshot.is_complete(tech), !queue.contains(tech));
        }
    }

    #[test]
    fn test_scores_are_finite_and_total(
        turn in 1u32..400,
        industry in 0.0f64..500.0,
        research in 0.0f64..500.0,
        population in 0.0f64..200.0,
        colonies in 0usize..30,
        outposts in 0usize..30,
        military_ships in 0u32..60,
        scouts in 0u32..6,
        best_ship_rating in 0.0f64..5000.0,
        unexplored_systems in 0usize..40,
        aggression in 0u8..6,
    ) {
        let aggression = match aggression {
            0 => Aggression::Beginner,
            1 => Aggression::Turtle,
            2 => Aggression::Cautious,
            3 => Aggression::Typical,
            4 => Aggression::Aggressive,
            _ => Aggression::Maniacal,
        };
        let config = PlannerConfig::default();
        let coefficients = coefficients_for(&config, EmpireId(1), aggression).expect("default tables are complete");
        let engine = PriorityEngine::new(config, coefficients);

        let snapshot = WorldSnapshot {
            turn,
            aggression,
            has_capital: true,
            industry,
            research,
            target_industry: industry * 1.1,
            target_research: research * 1.1,
            population,
            researchers: population * 0.2,
            colonies,
            outposts,
            fleets: FleetCounts { scouts, military_ships, ..Default::default() },
            best_ship_rating,
            best_ship_cost: 40.0,
            troop_pods_per_ship: 2,
            unexplored_systems,
            ..Default::default()
        };

        let (scores, _) = engine.compute(&snapshot, &PriorityState::default());
        prop_assert_eq!(scores.iter().count(), Domain::COUNT);
        for (domain, score) in scores.iter() {
            prop_assert!(score.is_finite() && score >= 0.0, "{} = {}", domain, score);
        }
    }
}
