//! Race Configuration
//!
//! Every tunable of a race in one serde document. Each section defaults to
//! the tuned values, so a JSON file only needs the fields it changes:
//!
//! ```json
//! { "vehicle": { "max_speed": 55.0 }, "lap": { "total_laps": 5 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::ghost::GhostConfig;
use crate::hazard::HazardConfig;
use crate::physics::PhysicsConfig;
use crate::track::LapConfig;
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub physics: PhysicsConfig,
    pub vehicle: VehicleConfig,
    pub hazard: HazardConfig,
    pub lap: LapConfig,
    pub ghost: GhostConfig,
}

impl RaceConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config = RaceConfig::from_json(r#"{ "vehicle": { "max_speed": 55.0 }, "lap": { "total_laps": 5 } }"#).unwrap();
        assert_eq!(config.vehicle.max_speed, 55.0);
        assert_eq!(config.lap.total_laps, 5);
        assert_eq!(config.lap.countdown, LapConfig::default().countdown);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(RaceConfig::from_json("{}").unwrap(), RaceConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let mut config = RaceConfig::default();
        config.hazard.oil.attenuation = 0.2;
        let json = config.to_json().unwrap();
        assert_eq!(RaceConfig::from_json(&json).unwrap(), config);
    }
}
