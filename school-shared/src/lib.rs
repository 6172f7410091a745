#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A point or direction in simulation space
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point3) -> f32 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z).magnitude()
    }
}

/// State of one fish as handed to a renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FishSnapshot {
    pub position: Point3,
    pub velocity: Point3,
    pub size: f32,
}

/// The whole school after a given number of steps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchoolSnapshot {
    pub step: u64,
    pub sphere_radius: f32,
    pub centre_of_mass: Point3,
    pub fish: Vec<FishSnapshot>,
}

impl SchoolSnapshot {
    /// Whether every fish lies within the sphere, allowing for its own size
    /// and `slack`.
    pub fn is_contained(&self, slack: f32) -> bool {
        self.fish
            .iter()
            .all(|fish| fish.position.magnitude() <= self.sphere_radius + fish.size + slack)
    }

    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Rule tuning constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleSettings {
    pub cohesion_divisor: f32,
    pub separation_distance: f32,
    pub separation_scale: f32,
    pub alignment_divisor: f32,
    pub boundary_slack: f32,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            cohesion_divisor: 1000.0,
            separation_distance: 1.0,
            separation_scale: 0.1,
            alignment_divisor: 8.0,
            boundary_slack: 0.001,
        }
    }
}

/// School simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchoolSettings {
    pub fish_count: usize,
    pub sphere_radius: f32,
    pub fish_length: f32,
    /// Fixed seed for reproducible runs. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub rules: RuleSettings,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            fish_count: 10,
            sphere_radius: 10.0,
            fish_length: 1.0,
            seed: None,
            rules: RuleSettings::default(),
        }
    }
}

impl SchoolSettings {
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let p2 = Point3::new(2.0, 3.0, 6.0);
        assert_eq!(p1.distance_to(&p2), 7.0);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings = SchoolSettings::from_json(r#"{"fish_count": 25, "rules": {"alignment_divisor": 4.0}}"#)
            .unwrap();

        assert_eq!(settings.fish_count, 25);
        assert_eq!(settings.sphere_radius, 10.0);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.rules.alignment_divisor, 4.0);
        assert_eq!(settings.rules.cohesion_divisor, 1000.0);
    }

    #[test]
    fn test_snapshot_containment() {
        let mut snapshot = SchoolSnapshot {
            step: 3,
            sphere_radius: 10.0,
            centre_of_mass: Point3::default(),
            fish: vec![FishSnapshot {
                position: Point3::new(0.0, 11.0, 0.0),
                velocity: Point3::default(),
                size: 1.0,
            }],
        };
        assert!(snapshot.is_contained(0.001));

        snapshot.fish[0].position = Point3::new(0.0, 11.5, 0.0);
        assert!(!snapshot.is_contained(0.001));
    }

    #[test]
    fn test_snapshot_json_field_names() {
        let snapshot = SchoolSnapshot {
            step: 1,
            sphere_radius: 10.0,
            centre_of_mass: Point3::new(1.0, 2.0, 3.0),
            fish: Vec::new(),
        };
        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""step":1"#));
        assert!(json.contains(r#""centre_of_mass":{"x":1.0,"y":2.0,"z":3.0}"#));
    }
}
