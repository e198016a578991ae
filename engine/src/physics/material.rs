//! Materials and contact materials
//!
//! Every body carries a [`MaterialTag`]. When two bodies touch, the backend
//! looks up the [`ContactMaterial`] for the pair to get friction and
//! restitution. Pairs are unordered: `(Car, Obstacle)` and `(Obstacle, Car)`
//! resolve to the same entry.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Surface material of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialTag {
    /// Ground and anything without a more specific material
    #[default]
    Default,
    /// Track-side obstacles (walls, barriers, cones)
    Obstacle,
    /// Vehicle chassis
    Car,
}

impl MaterialTag {
    /// Tag as written in track data.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialTag::Default => "default",
            MaterialTag::Obstacle => "obstacle",
            MaterialTag::Car => "car",
        }
    }
}

impl fmt::Display for MaterialTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(MaterialTag::Default),
            "obstacle" => Ok(MaterialTag::Obstacle),
            "car" => Ok(MaterialTag::Car),
            _ => Err(ConfigError::UnknownMaterial(s.to_string())),
        }
    }
}

/// Friction and restitution used when two materials touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    /// Tangential friction coefficient (0 = frictionless)
    pub friction: f32,
    /// Bounciness along the contact normal (0 = no bounce, 1 = elastic)
    pub restitution: f32,
}

impl ContactMaterial {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self::new(0.3, 0.0)
    }
}

/// Unordered material pair used as the table key.
fn pair_key(a: MaterialTag, b: MaterialTag) -> (MaterialTag, MaterialTag) {
    if (a as u8) <= (b as u8) { (a, b) } else { (b, a) }
}

/// Contact-material matrix for a physics world.
#[derive(Debug, Clone)]
pub struct ContactMaterialTable {
    entries: HashMap<(MaterialTag, MaterialTag), ContactMaterial>,
    fallback: ContactMaterial,
}

impl Default for ContactMaterialTable {
    /// Arcade tuning: the car slides along the ground and walls without
    /// friction (the vehicle model handles grip itself) and bounces slightly
    /// off obstacles.
    fn default() -> Self {
        let mut table = Self::empty(ContactMaterial::default());
        table.insert(MaterialTag::Default, MaterialTag::Default, ContactMaterial::new(0.3, 0.0));
        table.insert(MaterialTag::Car, MaterialTag::Default, ContactMaterial::new(0.0, 0.0));
        table.insert(MaterialTag::Car, MaterialTag::Obstacle, ContactMaterial::new(0.0, 0.2));
        table.insert(MaterialTag::Obstacle, MaterialTag::Default, ContactMaterial::new(0.5, 0.0));
        table.insert(MaterialTag::Car, MaterialTag::Car, ContactMaterial::new(0.1, 0.3));
        table
    }
}

impl ContactMaterialTable {
    /// Table with no explicit pairs; every lookup returns `fallback`.
    pub fn empty(fallback: ContactMaterial) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Register (or replace) the contact material for a pair.
    pub fn insert(&mut self, a: MaterialTag, b: MaterialTag, material: ContactMaterial) {
        self.entries.insert(pair_key(a, b), material);
    }

    /// Contact material for a pair, or the fallback.
    pub fn get(&self, a: MaterialTag, b: MaterialTag) -> ContactMaterial {
        self.entries
            .get(&pair_key(a, b))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Number of explicit pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_tag_parsing() {
        assert_eq!("car".parse::<MaterialTag>(), Ok(MaterialTag::Car));
        assert_eq!(" Obstacle ".parse::<MaterialTag>(), Ok(MaterialTag::Obstacle));
        assert_eq!("".parse::<MaterialTag>(), Ok(MaterialTag::Default));
        assert_eq!(
            "rubber".parse::<MaterialTag>(),
            Err(ConfigError::UnknownMaterial("rubber".to_string()))
        );
    }

    #[test]
    fn test_pairs_are_unordered() {
        let table = ContactMaterialTable::default();
        assert_eq!(
            table.get(MaterialTag::Obstacle, MaterialTag::Car),
            table.get(MaterialTag::Car, MaterialTag::Obstacle)
        );
        assert_eq!(table.get(MaterialTag::Car, MaterialTag::Default).friction, 0.0);
    }

    #[test]
    fn test_fallback_used_for_missing_pair() {
        let fallback = ContactMaterial::new(0.9, 0.1);
        let table = ContactMaterialTable::empty(fallback);
        assert!(table.is_empty());
        assert_eq!(table.get(MaterialTag::Car, MaterialTag::Car), fallback);
    }
}
