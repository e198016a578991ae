//! Contact events
//!
//! The physics step never calls back into game code. Instead every contact
//! involving a dynamic body is pushed into a bounded [`ContactQueue`]. Game
//! systems drain their events at the start of the next tick, so contacts
//! are always exactly one tick old when they are consumed.

use std::collections::HashSet;

use glam::Vec3;

use super::backend::BodyHandle;
use super::material::MaterialTag;

/// Default number of events the queue holds per step.
pub const DEFAULT_CONTACT_CAPACITY: usize = 64;

/// One contact between a dynamic body and another body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    /// The dynamic body this event is addressed to
    pub body: BodyHandle,
    /// The body it touched
    pub other: BodyHandle,
    /// Material of the touched body
    pub other_material: MaterialTag,
    /// Unit normal pointing from `body` towards `other`
    pub normal: Vec3,
    /// Penetration depth when the contact was detected (meters)
    pub depth: f32,
}

/// Bounded, per-step contact event buffer.
#[derive(Debug, Clone)]
pub struct ContactQueue {
    events: Vec<ContactEvent>,
    /// (body, other) pairs already recorded this step
    seen: HashSet<(BodyHandle, BodyHandle)>,
    capacity: usize,
    dropped: usize,
}

impl Default for ContactQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CONTACT_CAPACITY)
    }
}

impl ContactQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Start a new step: undrained events from the previous step are stale.
    pub fn begin_step(&mut self) {
        if !self.events.is_empty() {
            log::trace!("discarding {} undrained contact events", self.events.len());
        }
        self.events.clear();
        self.seen.clear();
        self.dropped = 0;
    }

    /// Record an event. Returns false if it was a duplicate pair or the
    /// queue is full.
    pub fn push(&mut self, event: ContactEvent) -> bool {
        if !self.seen.insert((event.body, event.other)) {
            return false;
        }
        if self.events.len() >= self.capacity {
            if self.dropped == 0 {
                log::warn!("contact queue full ({} events), dropping contacts", self.capacity);
            }
            self.dropped += 1;
            return false;
        }
        self.events.push(event);
        true
    }

    /// Remove and return every event addressed to `body`.
    pub fn drain_for(&mut self, body: BodyHandle) -> Vec<ContactEvent> {
        let mut drained = Vec::new();
        self.events.retain(|event| {
            if event.body == body {
                drained.push(*event);
                false
            } else {
                true
            }
        });
        drained
    }

    /// Forget every event that mentions `body` (used when a body is removed).
    pub fn forget(&mut self, body: BodyHandle) {
        self.events.retain(|e| e.body != body && e.other != body);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped this step because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(body: u32, other: u32) -> ContactEvent {
        ContactEvent {
            body: BodyHandle::from_raw(body),
            other: BodyHandle::from_raw(other),
            other_material: MaterialTag::Obstacle,
            normal: Vec3::X,
            depth: 0.01,
        }
    }

    #[test]
    fn test_duplicate_pairs_recorded_once() {
        let mut queue = ContactQueue::default();
        assert!(queue.push(event(1, 2)));
        assert!(!queue.push(event(1, 2)));
        assert!(queue.push(event(2, 1)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut queue = ContactQueue::with_capacity(2);
        queue.push(event(1, 2));
        queue.push(event(1, 3));
        assert!(!queue.push(event(1, 4)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn test_drain_only_takes_own_events() {
        let mut queue = ContactQueue::default();
        queue.push(event(1, 2));
        queue.push(event(3, 2));
        let drained = queue.drain_for(BodyHandle::from_raw(1));
        assert_eq!(drained.len(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_begin_step_clears_stale_events() {
        let mut queue = ContactQueue::default();
        queue.push(event(1, 2));
        queue.begin_step();
        assert!(queue.is_empty());
        assert!(queue.push(event(1, 2)));
    }
}
