//! Declarative acceleration rules
//!
//! A rule pairs a condition over the snapshot and the queue with an ordered
//! tech list. When the condition holds, the techs (and their incomplete
//! prerequisites) are pulled forward to the rule's target slot, unless they
//! already sit within the rule's lookahead window. Rules run in table order
//! and share a cursor: the slot after the last tech accelerated this tick.
//!
//! Rules may be linked into a chain. A chain is walked in table order and
//! stops at the first link whose tech is already complete; later links of
//! that chain are not evaluated this tick.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{Aggression, TechId, Tick};
use crate::priority::{Domain, PriorityState};
use crate::research::queue::{QueueEditor, ResearchQueue};
use crate::snapshot::WorldSnapshot;

/// Facts about the empire's holdings used by rule conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmpireTag {
    /// Owns a planet orbiting a black hole
    BlackHole,
    AsteroidBelt,
    GasGiant,
    AncientRuins,
    /// Has a telepathic species
    Telepathic,
}

/// Rule condition vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    TechComplete { tech: TechId },
    TechNotComplete { tech: TechId },
    /// Predicted turns left of a gate tech is one of `within`
    GateTurnsLeft { tech: TechId, within: Vec<i32> },
    HasTag { tag: EmpireTag },
    AggressionAtLeast { level: Aggression },
    AggressionAbove { level: Aggression },
    TurnAfter { turn: Tick },
    NoEnemiesSighted,
    /// Tech is not among the first `cursor + extra` queue items
    NotNearFront { tech: TechId, extra: usize },
    PopulationAbove { population: f64 },
    ResearchersAtLeast { researchers: f64 },
    /// No colonizing species finds any planet type Adequate
    NoAdequateColonizer,
    PriorityAbove { domain: Domain, value: f64 },
    AnyOf { conditions: Vec<Condition> },
    AllOf { conditions: Vec<Condition> },
}

/// Where a rule's batch is inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSlot {
    /// The slot after the last tech accelerated this tick
    Cursor,
    /// After the first listed anchor found in the queue; falls back to the
    /// cursor when none is queued
    Anchored { anchors: Vec<SlotAnchor> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAnchor {
    pub tech: TechId,
    pub offset: usize,
}

/// Membership of a rule in a chain of links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub group: String,
    /// Once this tech is complete the chain ends at this link
    pub until: TechId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationRule {
    pub name: String,
    #[serde(default)]
    pub chain: Option<ChainLink>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub target: TargetSlot,
    /// Skip the rule when this tech already sits before the target slot
    #[serde(default)]
    pub guard: Option<TechId>,
    pub techs: Vec<TechId>,
    /// Techs within `[0, slot + lookahead)` are left where they are
    pub lookahead: usize,
}

/// What conditions can look at
pub struct RuleContext<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub queue: &'a ResearchQueue,
    pub priorities: &'a PriorityState,
    pub cursor: usize,
    /// Turns-left predictions are read from this many leading items
    pub horizon: usize,
}

impl RuleContext<'_> {
    /// Turns left of a gate tech as observed at the start of the tick. A
    /// gate missing from the leading items counts as 0; only a queued gate
    /// without a prediction reads as -1.
    pub fn gate_turns_left(&self, tech: &TechId) -> i32 {
        self.snapshot.queued_turns_left(tech, self.horizon).unwrap_or(0)
    }
}

impl Condition {
    pub fn holds(&self, ctx: &RuleContext) -> bool {
        let s = ctx.snapshot;
        match self {
            Condition::TechComplete { tech } => s.is_complete(tech),
            Condition::TechNotComplete { tech } => !s.is_complete(tech),
            Condition::GateTurnsLeft { tech, within } => within.contains(&ctx.gate_turns_left(tech)),
            Condition::HasTag { tag } => s.has_tag(*tag),
            Condition::AggressionAtLeast { level } => s.aggression >= *level,
            Condition::AggressionAbove { level } => s.aggression > *level,
            Condition::TurnAfter { turn } => s.turn > *turn,
            Condition::NoEnemiesSighted => !s.any_sightings(),
            Condition::NotNearFront { tech, extra } => !ctx.queue.in_front(tech, ctx.cursor + extra),
            Condition::PopulationAbove { population } => s.population > *population,
            Condition::ResearchersAtLeast { researchers } => s.researchers >= *researchers,
            Condition::NoAdequateColonizer => s.best_colonizer_adequate_types == 0,
            Condition::PriorityAbove { domain, value } => ctx.priorities.get(*domain) > *value,
            Condition::AnyOf { conditions } => conditions.iter().any(|c| c.holds(ctx)),
            Condition::AllOf { conditions } => conditions.iter().all(|c| c.holds(ctx)),
        }
    }

    fn validate(&self, rule: &str) -> Result<(), String> {
        match self {
            Condition::GateTurnsLeft { tech, within } => {
                if within.is_empty() {
                    return Err(format!("rule {rule}: empty turns-left set for {tech}"));
                }
                if within.iter().any(|t| *t < 0) {
                    return Err(format!(
                        "rule {rule}: turns-left set for {tech} must not contain the no-prediction value"
                    ));
                }
                Ok(())
            }
            Condition::AnyOf { conditions } | Condition::AllOf { conditions } => {
                conditions.iter().try_for_each(|c| c.validate(rule))
            }
            _ => Ok(()),
        }
    }
}

impl TargetSlot {
    pub fn resolve(&self, queue: &ResearchQueue, cursor: usize) -> usize {
        match self {
            TargetSlot::Cursor => cursor,
            TargetSlot::Anchored { anchors } => anchors
                .iter()
                .find_map(|a| queue.position(&a.tech).map(|p| p + a.offset))
                .unwrap_or(cursor),
        }
    }
}

impl AccelerationRule {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("acceleration rules need a name".to_string());
        }
        if self.lookahead == 0 {
            return Err(format!("rule {}: lookahead must be at least 1", self.name));
        }
        if self.techs.is_empty() {
            return Err(format!("rule {}: no techs to accelerate", self.name));
        }
        if self.chain.as_ref().is_some_and(|link| link.group.is_empty()) {
            return Err(format!("rule {}: chain group needs a name", self.name));
        }
        self.conditions.iter().try_for_each(|c| c.validate(&self.name))
    }

    pub fn applies(&self, ctx: &RuleContext) -> bool {
        self.conditions.iter().all(|c| c.holds(ctx))
    }
}

/// Run every rule in table order. Returns the names of the rules that fired.
pub fn accelerate(
    editor: &mut QueueEditor,
    rules: &[AccelerationRule],
    priorities: &PriorityState,
    floor: usize,
    horizon: usize,
) -> Vec<String> {
    let mut cursor = floor;
    let mut fired = Vec::new();
    let mut ended_chains: AHashSet<&str> = AHashSet::new();

    for rule in rules {
        if let Some(link) = &rule.chain {
            if ended_chains.contains(link.group.as_str()) {
                continue;
            }
            if editor.snapshot().is_complete(&link.until) {
                debug!(rule = %rule.name, chain = %link.group, until = %link.until, "chain ends");
                ended_chains.insert(link.group.as_str());
                continue;
            }
        }

        let slot = {
            let ctx = RuleContext {
                snapshot: editor.snapshot(),
                queue: editor.queue(),
                priorities,
                cursor,
                horizon,
            };
            if !rule.applies(&ctx) {
                continue;
            }
            rule.target.resolve(editor.queue(), cursor).max(floor)
        };

        if let Some(guard) = &rule.guard {
            if editor.queue().position(guard).is_some_and(|p| p < slot) {
                debug!(rule = %rule.name, %guard, "guard already ahead of target slot");
                continue;
            }
        }

        debug!(rule = %rule.name, slot, "acceleration rule fired");
        cursor = apply_batch(editor, rule, slot, cursor);
        fired.push(rule.name.clone());
    }

    fired
}

/// Pull a rule's batch forward starting at `slot`; returns the new cursor
fn apply_batch(editor: &mut QueueEditor, rule: &AccelerationRule, mut slot: usize, mut cursor: usize) -> usize {
    let mut handled = AHashSet::new();
    let batch = editor.expand(&rule.techs, &mut handled);

    for tech in &batch {
        if let Some(p) = editor.queue().position(tech) {
            if p < slot + rule.lookahead {
                slot = slot.max(p + 1);
                cursor = cursor.max(p + 1);
                continue;
            }
        }
        if let Some(index) = editor.place(tech, slot).index() {
            slot = slot.max(index + 1);
            cursor = cursor.max(index + 1);
        }
    }

    cursor
}
