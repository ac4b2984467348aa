use serde::Serialize;
use thiserror::Error;

use crate::core::types::TechId;

/// Fatal startup failures: the run's math is undefined without a valid config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Style index {index} out of range (table has {available} entries)")]
    StyleIndexOutOfRange { index: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Problems with the prerequisite graph of a single tech
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum CatalogError {
    #[error("Unknown tech: {0}")]
    UnknownTech(TechId),

    #[error("Tech {tech} requires {prerequisite}, which is not in the catalog")]
    MissingPrerequisite { tech: TechId, prerequisite: TechId },

    #[error("Tech {0} is part of a prerequisite cycle")]
    CyclicPrerequisite(TechId),
}

/// Failure reported by the game-state collaborator for an issued order
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Order rejected: {reason}")]
    Rejected { reason: String },

    #[error("Unknown tech: {0}")]
    UnknownTech(TechId),
}

/// Soft failures collected during a tick. None of these abort the tick.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickWarning {
    #[error("Missing data: {what}")]
    MissingData { what: String },

    #[error("Invalid operation {command}: {reason}")]
    InvalidOperation { command: String, reason: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Deferred {tech}: prerequisite {missing} is neither complete nor queued")]
    Deferred { tech: TechId, missing: TechId },
}

impl TickWarning {
    pub fn missing(what: impl Into<String>) -> Self {
        TickWarning::MissingData { what: what.into() }
    }
}
