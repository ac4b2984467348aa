//! Research queue planning
//!
//! - `catalog`: the tech prerequisite DAG loaded from content
//! - `queue`: the ordered queue and the clamped placement editor
//! - `seeding`, `acceleration`, `pruning`: the three ways the scheduler edits
//!   the queue
//! - `scheduler`: runs them in order once per tick

pub mod acceleration;
pub mod catalog;
pub mod pruning;
pub mod queue;
pub mod scheduler;
pub mod seeding;

pub use catalog::{TechCatalog, TechDefinition, TechStatus};
pub use queue::{QueueCommand, QueueItem, ResearchQueue};
pub use scheduler::{QueueScheduler, ScheduleOutcome};
