//! Queue seeding, defensive fast-track and the default top-up pass

use ahash::AHashSet;
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::core::config::QueueConfig;
use crate::core::types::TechId;
use crate::research::catalog::TechStatus;
use crate::research::queue::{QueueEditor, ResearchQueue};
use crate::snapshot::WorldSnapshot;

/// Seeding runs on the first turn, and on early turns whenever the queue
/// has run dry
pub fn should_seed(snapshot: &WorldSnapshot, queue: &ResearchQueue, config: &QueueConfig) -> bool {
    snapshot.turn == 1 || (snapshot.turn < config.seeding_turn_limit && queue.is_empty())
}

pub fn should_top_up(snapshot: &WorldSnapshot, config: &QueueConfig) -> bool {
    snapshot.turn > config.top_up_after_turn
}

/// Append a priority list, each tech preceded by its unmet prerequisites.
/// Returns the number of techs enqueued.
pub fn seed(editor: &mut QueueEditor, list: &[TechId]) -> usize {
    let mut handled: AHashSet<TechId> = editor.queue().techs().cloned().collect();
    let batch = editor.expand(list, &mut handled);

    let mut placed = 0;
    for tech in &batch {
        if editor.append(tech).index().is_some() {
            placed += 1;
        }
    }
    info!(turn = editor.snapshot().turn, placed, "seeded research queue");
    placed
}

/// Pull defense techs to the front for defensive empires
pub fn fast_track_defense(editor: &mut QueueEditor, config: &QueueConfig) -> usize {
    if editor.snapshot().aggression > config.defensive_aggression {
        return 0;
    }

    let mut placed = 0;
    for tech in &config.defense_techs {
        if editor.snapshot().is_complete(tech) || editor.queue().in_front(tech, config.defense_window) {
            continue;
        }
        let mut slot = config.defense_slot.min(editor.queue().len());
        let mut handled = AHashSet::new();
        for step in editor.expand(std::slice::from_ref(tech), &mut handled) {
            if let Some(index) = editor.place(&step, slot).index() {
                slot = index + 1;
                placed += 1;
            }
        }
        debug!(%tech, "defense tech fast-tracked");
    }
    placed
}

/// Techs the top-up pass may add: researchable with every direct
/// prerequisite done, not excluded and not queued, cheapest first
pub fn available_techs(editor: &QueueEditor, excluded: &[TechId]) -> Vec<(f64, TechId)> {
    let snapshot = editor.snapshot();
    let catalog = editor.catalog();

    let mut available: Vec<(f64, TechId)> = catalog
        .ids()
        .filter(|tech| snapshot.tech_status(tech) == TechStatus::Researchable)
        .filter(|tech| !excluded.contains(tech) && !editor.queue().contains(tech))
        .filter(|tech| catalog.prerequisites(tech).iter().all(|p| snapshot.is_complete(p)))
        .filter_map(|tech| catalog.cost(tech).map(|cost| (cost, tech.clone())))
        .collect();
    available.sort_by(|a, b| OrderedFloat(a.0).cmp(&OrderedFloat(b.0)).then_with(|| a.1.cmp(&b.1)));
    available
}

/// Append the cheapest available techs while the research budget lasts
pub fn top_up(editor: &mut QueueEditor, excluded: &[TechId]) -> usize {
    let mut budget = editor.snapshot().research;
    let mut placed = 0;

    for (cost, tech) in available_techs(editor, excluded) {
        if budget <= 0.0 {
            break;
        }
        budget -= cost;
        if editor.append(&tech).index().is_some() {
            placed += 1;
        }
    }
    if placed > 0 {
        debug!(turn = editor.snapshot().turn, placed, "topped up research queue");
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Aggression;
    use crate::research::catalog::{TechCatalog, TechDefinition};
    use crate::research::queue::QueueItem;

    fn id(s: &str) -> TechId {
        TechId::from(s)
    }

    fn catalog() -> TechCatalog {
        TechCatalog::from_definitions(vec![
            TechDefinition::new("ROOT", 10.0, &[]),
            TechDefinition::new("MID", 20.0, &["ROOT"]),
            TechDefinition::new("TOP", 40.0, &["MID", "SIDE"]),
            TechDefinition::new("SIDE", 15.0, &[]),
            TechDefinition::new("DEF", 12.0, &["ROOT"]),
            TechDefinition::new("CHEAP", 5.0, &[]),
            TechDefinition::new("PRICEY", 500.0, &[]),
        ])
        .unwrap()
    }

    fn names(queue: &ResearchQueue) -> Vec<&str> {
        queue.techs().map(|t| t.as_str()).collect()
    }

    fn config() -> QueueConfig {
        QueueConfig {
            defense_techs: vec![id("DEF")],
            defense_slot: 1,
            defense_window: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_seeding_window() {
        let config = config();
        let mut snapshot = WorldSnapshot {
            turn: 1,
            ..Default::default()
        };
        let mut queue = ResearchQueue::from_items([QueueItem::new(id("ROOT"))]);
        assert!(should_seed(&snapshot, &queue, &config));

        snapshot.turn = 3;
        assert!(!should_seed(&snapshot, &queue, &config));
        queue = ResearchQueue::new();
        assert!(should_seed(&snapshot, &queue, &config));

        snapshot.turn = 5;
        assert!(!should_seed(&snapshot, &queue, &config));
    }

    #[test]
    fn test_seed_expands_prerequisites_depth_first() {
        let catalog = catalog();
        let snapshot = WorldSnapshot {
            turn: 1,
            ..Default::default()
        };
        let mut queue = ResearchQueue::new();
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        let placed = seed(&mut editor, &[id("TOP"), id("MID"), id("CHEAP")]);
        let (_, warnings) = editor.finish();

        assert_eq!(placed, 5);
        assert!(warnings.is_empty());
        assert_eq!(names(&queue), vec!["ROOT", "MID", "SIDE", "TOP", "CHEAP"]);
    }

    #[test]
    fn test_seed_skips_complete_and_queued() {
        let catalog = catalog();
        let mut snapshot = WorldSnapshot {
            turn: 1,
            ..Default::default()
        };
        snapshot.tech_status.insert(id("ROOT"), TechStatus::Complete);
        let mut queue = ResearchQueue::from_items([QueueItem::new(id("SIDE"))]);
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        seed(&mut editor, &[id("TOP")]);
        assert_eq!(names(&queue), vec!["SIDE", "MID", "TOP"]);
    }

    #[test]
    fn test_defensive_empire_fast_tracks_defense() {
        let catalog = catalog();
        let config = config();
        let snapshot = WorldSnapshot {
            turn: 1,
            aggression: Aggression::Turtle,
            ..Default::default()
        };
        let mut queue = ResearchQueue::from_items(
            ["CHEAP", "SIDE", "ROOT", "MID"].iter().map(|t| QueueItem::new(id(t))),
        );
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        assert_eq!(fast_track_defense(&mut editor, &config), 2);
        // ROOT is pulled forward with DEF
        assert_eq!(names(&queue), vec!["CHEAP", "ROOT", "DEF", "SIDE", "MID"]);
    }

    #[test]
    fn test_typical_empire_skips_defense() {
        let catalog = catalog();
        let snapshot = WorldSnapshot {
            turn: 1,
            aggression: Aggression::Typical,
            ..Default::default()
        };
        let mut queue = ResearchQueue::new();
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        assert_eq!(fast_track_defense(&mut editor, &config()), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_top_up_adds_cheapest_within_budget() {
        let catalog = catalog();
        let snapshot = WorldSnapshot {
            turn: 120,
            research: 25.0,
            ..Default::default()
        };
        let mut queue = ResearchQueue::new();
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        // CHEAP (5) and ROOT (10) leave 10, SIDE (15) takes it below zero
        let placed = top_up(&mut editor, &[]);
        assert_eq!(placed, 3);
        assert_eq!(names(&queue), vec!["CHEAP", "ROOT", "SIDE"]);
    }

    #[test]
    fn test_top_up_respects_exclusions() {
        let catalog = catalog();
        let snapshot = WorldSnapshot {
            turn: 120,
            research: 6.0,
            ..Default::default()
        };
        let mut queue = ResearchQueue::new();
        let mut editor = QueueEditor::new(&mut queue, &catalog, &snapshot);

        top_up(&mut editor, &[id("CHEAP")]);
        assert_eq!(names(&queue), vec!["ROOT"]);
    }
}
