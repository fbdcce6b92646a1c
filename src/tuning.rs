//! Contact tolerances for player collision
//!
//! These small epsilons separate resting contact from passing through.
//! Shrinking them lets the player tunnel into blocks; growing them causes
//! false landings. The defaults are the canonical game feel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Largest vertical speed relative to a block that still counts as
    /// resting on it (and its negation for head bumps)
    pub contact_velocity: f32,
    /// How far the player's feet may sit above a block top and still land
    pub contact_snap: f32,
    /// Inset applied to edge overlap tests so grazing corners do not catch
    pub edge_inset: f32,
    /// Slack when testing whether a block engulfs the player
    pub crush_tolerance: f32,
    /// Extra distance beyond touching at which blocks are still tested
    pub cull_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            contact_velocity: 0.1,
            contact_snap: 0.05,
            edge_inset: 0.01,
            crush_tolerance: 0.1,
            cull_margin: 0.2,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
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
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "crush_tolerance": 0.2 }"#).unwrap();
        assert_eq!(tuning.crush_tolerance, 0.2);
        assert_eq!(tuning.contact_snap, 0.05);
        assert_eq!(tuning.edge_inset, 0.01);
    }

    #[test]
    fn test_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ contact_snap: }").is_err());
    }
}
