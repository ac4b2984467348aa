//! Style and aggression modulation
//!
//! Two empires with the same identifier and aggression always select the same
//! coefficient tables, so a whole run replays deterministically.

use serde::{Deserialize, Serialize};

use crate::core::config::PlannerConfig;
use crate::core::error::ConfigError;
use crate::core::types::{Aggression, EmpireId, Tick};

/// Number of priority styles a config must provide tables for
pub const PRIORITY_STYLE_COUNT: usize = 3;

/// Number of research seed lists a config must provide
pub const RESEARCH_INDEX_COUNT: usize = 5;

/// Style index used by the score engine: empire parity, shifted up one for
/// maniacal empires (0..=2)
pub fn priority_style_index(empire: EmpireId, aggression: Aggression) -> usize {
    let mut index = (empire.0 % 2) as usize;
    if aggression >= Aggression::Maniacal {
        index += 1;
    }
    index
}

/// Research index selecting the seed tech list (0..=4)
pub fn research_index(empire: EmpireId, aggression: Aggression) -> usize {
    if aggression >= Aggression::Aggressive {
        2 + (empire.0 % 3) as usize
    } else if aggression >= Aggression::Typical {
        1 + (empire.0 % 2) as usize
    } else {
        (empire.0 % 2) as usize
    }
}

/// Coefficients selected for one empire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub style_index: usize,
    pub aggression: Aggression,
    pub research_cutoffs: [Tick; 4],
    pub research_settings: [f64; 5],
}

/// Look up the coefficient table for an aggression level and style index
pub fn select_coefficients(
    config: &PlannerConfig,
    aggression: Aggression,
    style_index: usize,
) -> Result<CoefficientTable, ConfigError> {
    let tables = &config.styles;
    let available = tables.research_cutoffs.len().min(tables.research_settings.len());
    if style_index >= available {
        return Err(ConfigError::StyleIndexOutOfRange {
            index: style_index,
            available,
        });
    }

    Ok(CoefficientTable {
        style_index,
        aggression,
        research_cutoffs: tables.research_cutoffs[style_index],
        research_settings: tables.research_settings[style_index],
    })
}

/// Select the table for an empire, deriving its style index
pub fn coefficients_for(
    config: &PlannerConfig,
    empire: EmpireId,
    aggression: Aggression,
) -> Result<CoefficientTable, ConfigError> {
    select_coefficients(config, aggression, priority_style_index(empire, aggression))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_style_uses_parity() {
        assert_eq!(priority_style_index(EmpireId(4), Aggression::Typical), 0);
        assert_eq!(priority_style_index(EmpireId(7), Aggression::Typical), 1);
        assert_eq!(priority_style_index(EmpireId(7), Aggression::Maniacal), 2);
    }

    #[test]
    fn test_research_index_ranges() {
        for id in 0..12 {
            for aggression in Aggression::ALL {
                let index = research_index(EmpireId(id), aggression);
                assert!(index < RESEARCH_INDEX_COUNT, "index {index} for {aggression:?}");
            }
        }
        assert_eq!(research_index(EmpireId(3), Aggression::Cautious), 1);
        assert_eq!(research_index(EmpireId(3), Aggression::Typical), 2);
        assert_eq!(research_index(EmpireId(3), Aggression::Maniacal), 2);
        assert_eq!(research_index(EmpireId(5), Aggression::Aggressive), 4);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let config = PlannerConfig::default();
        let a = coefficients_for(&config, EmpireId(9), Aggression::Aggressive).unwrap();
        let b = coefficients_for(&config, EmpireId(9), Aggression::Aggressive).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.style_index, 1);
        assert_eq!(a.research_cutoffs, [30, 45, 70, 150]);
    }

    #[test]
    fn test_out_of_range_style_is_config_error() {
        let config = PlannerConfig::default();
        let result = select_coefficients(&config, Aggression::Typical, 3);
        assert!(matches!(
            result,
            Err(ConfigError::StyleIndexOutOfRange { index: 3, available: 3 })
        ));
    }
}
