//! Research sub-category priorities
//!
//! Each category is either its configured value or its fallback, depending on
//! which production domain currently scores highest.

use crate::priority::{Domain, PriorityState, ScoringContext};

pub fn learning(ctx: &ScoringContext) -> f64 {
    if ctx.snapshot.turn == 1 {
        ctx.config.categories.learning_first_turn
    } else {
        0.0
    }
}

/// Top production domain from the scores computed so far this tick
pub fn top_production_domain(ctx: &ScoringContext, scratch: &PriorityState) -> Option<Domain> {
    scratch.top_of(&ctx.config.categories.production_domains)
}

pub fn gated(domain: Domain, ctx: &ScoringContext, scratch: &PriorityState) -> f64 {
    let Some(gate) = ctx.config.categories.gates.iter().find(|g| g.domain == domain) else {
        return 0.0;
    };
    match top_production_domain(ctx, scratch) {
        Some(top) if gate.when_top.contains(&top) => gate.value,
        _ => gate.otherwise,
    }
}
