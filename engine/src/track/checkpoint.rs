//! Checkpoint gates
//!
//! A gate is a segment between two world points. Gates form a ring indexed
//! 0..N-1; gate 0 is the start/finish line.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use super::footprint::VehicleFootprint;
use super::geometry::distance_point_to_segment;
use crate::error::ConfigError;
use crate::physics::types::ground_xz;

/// One gate of the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub index: usize,
    pub a: Vec3,
    pub b: Vec3,
    /// Indicator shown by the host for the gate the driver should hit next
    pub visible: bool,
}

impl Checkpoint {
    /// Gate midpoint in world space.
    pub fn center(&self) -> Vec3 {
        (self.a + self.b) * 0.5
    }

    /// Distance from a ground-plane point to the gate segment.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        distance_point_to_segment(point, ground_xz(self.a), ground_xz(self.b))
    }

    /// Any footprint point closer than `threshold`.
    pub fn is_touched_by(&self, footprint: &VehicleFootprint, threshold: f32) -> bool {
        footprint.any(|p| self.distance_to(p) < threshold)
    }
}

/// Fewest gates a lap can be made of
pub const MIN_GATES: usize = 2;

/// The ordered ring of gates.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRing {
    gates: Vec<Checkpoint>,
}

impl CheckpointRing {
    /// Build from `(index, position)` pairs. Every index in 0..N must appear
    /// exactly twice, and N must be at least [`MIN_GATES`].
    pub fn from_points(points: impl IntoIterator<Item = (usize, Vec3)>) -> Result<Self, ConfigError> {
        let mut grouped: BTreeMap<usize, Vec<Vec3>> = BTreeMap::new();
        for (index, position) in points {
            grouped.entry(index).or_default().push(position);
        }
        if grouped.is_empty() {
            return Err(ConfigError::MalformedCheckpoints("no checkpoints".to_string()));
        }
        if grouped.len() < MIN_GATES {
            return Err(ConfigError::MalformedCheckpoints(format!(
                "{} gate(s) defined, a lap needs at least {MIN_GATES}",
                grouped.len()
            )));
        }

        let mut gates = Vec::with_capacity(grouped.len());
        for (expected, (index, positions)) in grouped.into_iter().enumerate() {
            if index != expected {
                return Err(ConfigError::MalformedCheckpoints(format!(
                    "index {expected} is missing (next index is {index})"
                )));
            }
            let [a, b] = positions[..] else {
                return Err(ConfigError::MalformedCheckpoints(format!(
                    "checkpoint {index} has {} points, expected 2",
                    positions.len()
                )));
            };
            gates.push(Checkpoint {
                index,
                a,
                b,
                visible: false,
            });
        }
        Ok(Self { gates })
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.gates.get(index)
    }

    /// Index after `index`, wrapping to 0.
    pub fn next_index(&self, index: usize) -> usize {
        if self.gates.is_empty() {
            0
        } else {
            (index + 1) % self.gates.len()
        }
    }

    /// Show exactly one gate's indicator; out of range hides all.
    pub fn show_only(&mut self, index: usize) {
        for gate in &mut self.gates {
            gate.visible = gate.index == index;
        }
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(gate) = self.gates.get_mut(index) {
            gate.visible = visible;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.gates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(n: usize) -> Vec<(usize, Vec3)> {
        (0..n)
            .flat_map(|i| {
                let z = i as f32 * 10.0;
                [(i, Vec3::new(-5.0, 0.0, z)), (i, Vec3::new(5.0, 0.0, z))]
            })
            .collect()
    }

    #[test]
    fn test_ring_from_shuffled_points() {
        let mut points = pairs(3);
        points.reverse();
        let ring = CheckpointRing::from_points(points).unwrap();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.get(2).unwrap().center(), Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(ring.next_index(2), 0);
    }

    #[test]
    fn test_gap_in_indices_is_rejected() {
        let points = pairs(3).into_iter().filter(|(i, _)| *i != 1);
        assert!(matches!(
            CheckpointRing::from_points(points),
            Err(ConfigError::MalformedCheckpoints(_))
        ));
    }

    #[test]
    fn test_single_gate_is_rejected() {
        assert!(matches!(
            CheckpointRing::from_points(pairs(1)),
            Err(ConfigError::MalformedCheckpoints(_))
        ));
        assert_eq!(CheckpointRing::from_points(pairs(MIN_GATES)).unwrap().len(), MIN_GATES);
    }

    #[test]
    fn test_wrong_point_count_is_rejected() {
        let mut points = pairs(2);
        points.push((1, Vec3::ZERO));
        assert!(CheckpointRing::from_points(points).is_err());
        assert!(CheckpointRing::from_points(Vec::new()).is_err());
    }

    #[test]
    fn test_show_only_one_gate() {
        let mut ring = CheckpointRing::from_points(pairs(3)).unwrap();
        ring.show_only(1);
        let visible: Vec<usize> = ring.iter().filter(|g| g.visible).map(|g| g.index).collect();
        assert_eq!(visible, vec![1]);
    }

    #[test]
    fn test_touch_threshold() {
        let ring = CheckpointRing::from_points(pairs(2)).unwrap();
        let gate = ring.get(0).unwrap();
        assert!(gate.is_touched_by(&VehicleFootprint::from_point(Vec2::new(0.0, 1.0)), 1.5));
        assert!(!gate.is_touched_by(&VehicleFootprint::from_point(Vec2::new(0.0, 2.0)), 1.5));
    }
}
