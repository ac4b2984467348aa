//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Game turn counter (one discrete tick of the control loop)
pub type Tick = u32;

/// Stable identifier of a technology in the content database
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechId(pub String);

impl TechId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TechId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier for empires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
pub struct EmpireId(pub u32);

/// Unique identifier for star systems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct SystemId(pub u32);

/// Unique identifier for planets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

/// Discrete aggression setting of an AI empire
///
/// Ordered from most passive to most aggressive; comparisons follow
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Aggression {
    Beginner = 0,
    Turtle = 1,
    Cautious = 2,
    Typical = 3,
    Aggressive = 4,
    Maniacal = 5,
}

impl Aggression {
    pub const ALL: [Aggression; 6] = [
        Aggression::Beginner,
        Aggression::Turtle,
        Aggression::Cautious,
        Aggression::Typical,
        Aggression::Aggressive,
        Aggression::Maniacal,
    ];

    /// Numeric level used inside scoring formulas (0..=5)
    pub fn level(self) -> f64 {
        self as u8 as f64
    }
}

impl Default for Aggression {
    fn default() -> Self {
        Aggression::Typical
    }
}
