//! Empire AI - strategic priority scoring and research queue planning
//!
//! Each tick the `TurnPlanner` reads a typed snapshot of one empire, scores
//! every competing domain, publishes the scores, and edits the research
//! queue through seeding, acceleration and prune rules.

pub mod core;
pub mod game;
pub mod planner;
pub mod priority;
pub mod research;
pub mod snapshot;
pub mod style;

pub use planner::{TickReport, TurnPlanner};
