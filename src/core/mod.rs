pub mod config;
pub mod error;
pub mod types;

pub use config::PlannerConfig;
pub use error::{CatalogError, CommandError, ConfigError, TickWarning};
pub use types::{Aggression, EmpireId, PlanetId, SystemId, TechId, Tick};
