//! Lap state machine
//!
//! ```text
//! NotStarted --start()--> Countdown --expired--> Racing --last lap--> Finished
//!      ^                                                                 |
//!      +---------------------------- reset() ----------------------------+
//! ```
//!
//! While racing, only the current gate is tested. Crossing it advances the
//! ring; crossing gate 0 completes a lap. A crossed gate stays latched
//! until the whole footprint has left it, so parking on a gate advances the
//! ring once.

use serde::{Deserialize, Serialize};

use super::checkpoint::CheckpointRing;
use super::footprint::VehicleFootprint;

/// Default countdown length in seconds
pub const COUNTDOWN_SECONDS: f32 = 3.0;

/// Default gate crossing distance in meters
pub const CHECKPOINT_THRESHOLD: f32 = 1.5;

/// Default race length
pub const DEFAULT_TOTAL_LAPS: u32 = 3;

/// Lap and countdown settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapConfig {
    /// Countdown length (seconds)
    pub countdown: f32,
    /// Footprint-to-gate distance that counts as crossing (m)
    pub checkpoint_threshold: f32,
    /// Laps to finish the race; a track definition may override it
    pub total_laps: u32,
}

impl Default for LapConfig {
    fn default() -> Self {
        Self {
            countdown: COUNTDOWN_SECONDS,
            checkpoint_threshold: CHECKPOINT_THRESHOLD,
            total_laps: DEFAULT_TOTAL_LAPS,
        }
    }
}

/// Race phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RacePhase {
    #[default]
    NotStarted,
    Countdown {
        remaining: f32,
    },
    Racing,
    Finished,
}

impl RacePhase {
    pub fn is_racing(&self) -> bool {
        matches!(self, RacePhase::Racing)
    }
}

/// Things that happened during a tick, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// Displayed countdown second changed
    CountdownSecond(u32),
    RaceStarted,
    CheckpointCrossed { index: usize },
    LapCompleted { lap: u32, time: f32 },
    RaceFinished { total_time: f32 },
}

/// Progress through the checkpoint ring.
#[derive(Debug, Clone)]
pub struct LapState {
    ring: CheckpointRing,
    config: LapConfig,
    phase: RacePhase,
    current: usize,
    /// -1 until the race starts
    laps_completed: i32,
    lap_elapsed: f32,
    total_elapsed: f32,
    splits: Vec<f32>,
    best_lap: Option<f32>,
    /// Gate crossed last and still under the footprint
    latched: Option<usize>,
    last_crossed: Option<usize>,
}

impl LapState {
    pub fn new(ring: CheckpointRing, config: LapConfig) -> Self {
        Self {
            ring,
            config,
            phase: RacePhase::NotStarted,
            current: 0,
            laps_completed: -1,
            lap_elapsed: 0.0,
            total_elapsed: 0.0,
            splits: Vec::new(),
            best_lap: None,
            latched: None,
            last_crossed: None,
        }
    }

    /// Begin the countdown. Ignored unless the race has not started.
    pub fn start(&mut self, events: &mut Vec<RaceEvent>) -> bool {
        if self.phase != RacePhase::NotStarted {
            return false;
        }
        let countdown = self.config.countdown.max(0.0);
        if countdown > 0.0 {
            self.phase = RacePhase::Countdown { remaining: countdown };
            events.push(RaceEvent::CountdownSecond(display_second(countdown)));
            log::debug!("countdown started ({countdown}s)");
        } else {
            self.begin_racing(events);
        }
        true
    }

    /// Advance the countdown or the lap clocks.
    pub fn tick(&mut self, dt: f32, events: &mut Vec<RaceEvent>) {
        match self.phase {
            RacePhase::Countdown { remaining } => {
                let next = remaining - dt;
                if next <= 0.0 {
                    self.begin_racing(events);
                    return;
                }
                if display_second(next) != display_second(remaining) {
                    events.push(RaceEvent::CountdownSecond(display_second(next)));
                }
                self.phase = RacePhase::Countdown { remaining: next };
            }
            RacePhase::Racing => {
                self.lap_elapsed += dt;
                self.total_elapsed += dt;
            }
            RacePhase::NotStarted | RacePhase::Finished => {}
        }
    }

    /// Test the current gate against this tick's footprint.
    pub fn evaluate(&mut self, footprint: &VehicleFootprint, events: &mut Vec<RaceEvent>) {
        if !self.phase.is_racing() {
            return;
        }
        let threshold = self.config.checkpoint_threshold;

        if let Some(latched) = self.latched {
            let still_touching = self
                .ring
                .get(latched)
                .is_some_and(|gate| gate.is_touched_by(footprint, threshold));
            if still_touching {
                return;
            }
            self.latched = None;
        }

        let Some(gate) = self.ring.get(self.current) else {
            return;
        };
        if !gate.is_touched_by(footprint, threshold) {
            return;
        }

        let crossed = self.current;
        self.ring.set_visible(crossed, false);
        self.current = self.ring.next_index(crossed);
        self.ring.set_visible(self.current, true);
        self.latched = Some(crossed);
        self.last_crossed = Some(crossed);
        events.push(RaceEvent::CheckpointCrossed { index: crossed });
        log::trace!("checkpoint {crossed} crossed, next {}", self.current);

        if crossed == 0 {
            self.complete_lap(events);
        }
    }

    /// Abort: back to the pre-race state.
    pub fn reset(&mut self) {
        *self = Self::new(self.ring.clone(), self.config.clone());
        self.ring.show_only(usize::MAX);
        log::debug!("race reset");
    }

    fn begin_racing(&mut self, events: &mut Vec<RaceEvent>) {
        self.phase = RacePhase::Racing;
        self.laps_completed = 0;
        self.current = self.ring.next_index(0);
        self.lap_elapsed = 0.0;
        self.total_elapsed = 0.0;
        self.latched = None;
        self.ring.show_only(self.current);
        events.push(RaceEvent::RaceStarted);
        log::debug!("race started, {} laps over {} gates", self.config.total_laps, self.ring.len());
    }

    fn complete_lap(&mut self, events: &mut Vec<RaceEvent>) {
        self.laps_completed += 1;
        let time = self.lap_elapsed;
        self.splits.push(time);
        if self.best_lap.is_none_or(|best| time < best) {
            self.best_lap = Some(time);
        }
        self.lap_elapsed = 0.0;

        let lap = self.laps_completed.max(0) as u32;
        events.push(RaceEvent::LapCompleted { lap, time });
        log::debug!("lap {lap} completed in {time:.3}s");

        if lap >= self.config.total_laps {
            self.phase = RacePhase::Finished;
            self.ring.show_only(usize::MAX);
            events.push(RaceEvent::RaceFinished {
                total_time: self.total_elapsed,
            });
            log::debug!("race finished in {:.3}s", self.total_elapsed);
        }
    }

    // ========================================================================
    // GETTERS
    // ========================================================================

    pub fn get_phase(&self) -> RacePhase {
        self.phase
    }

    pub fn get_current_checkpoint(&self) -> usize {
        self.current
    }

    pub fn get_laps_completed(&self) -> i32 {
        self.laps_completed
    }

    pub fn get_total_laps(&self) -> u32 {
        self.config.total_laps
    }

    pub fn get_lap_elapsed(&self) -> f32 {
        self.lap_elapsed
    }

    pub fn get_total_elapsed(&self) -> f32 {
        self.total_elapsed
    }

    pub fn get_splits(&self) -> &[f32] {
        &self.splits
    }

    pub fn get_best_lap(&self) -> Option<f32> {
        self.best_lap
    }

    /// Gate crossed most recently, if any.
    pub fn get_last_crossed(&self) -> Option<usize> {
        self.last_crossed
    }

    pub fn get_ring(&self) -> &CheckpointRing {
        &self.ring
    }
}

/// Integer second shown while counting down.
fn display_second(remaining: f32) -> u32 {
    remaining.ceil().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    /// Four gates on a square loop, gate i at z = 20 * i.
    fn ring() -> CheckpointRing {
        let points = (0..4).flat_map(|i| {
            let z = i as f32 * 20.0;
            [(i, Vec3::new(-5.0, 0.0, z)), (i, Vec3::new(5.0, 0.0, z))]
        });
        CheckpointRing::from_points(points).unwrap()
    }

    fn at_gate(index: usize) -> VehicleFootprint {
        VehicleFootprint::from_point(Vec2::new(0.0, index as f32 * 20.0))
    }

    fn away() -> VehicleFootprint {
        VehicleFootprint::from_point(Vec2::new(100.0, 100.0))
    }

    fn racing(total_laps: u32) -> LapState {
        let config = LapConfig {
            total_laps,
            ..Default::default()
        };
        let mut lap = LapState::new(ring(), config);
        let mut events = Vec::new();
        lap.start(&mut events);
        lap.tick(COUNTDOWN_SECONDS + 0.1, &mut events);
        assert!(lap.get_phase().is_racing());
        lap
    }

    #[test]
    fn test_countdown_emits_each_second() {
        let mut lap = LapState::new(ring(), LapConfig::default());
        let mut events = Vec::new();
        assert_eq!(lap.get_laps_completed(), -1);
        assert!(lap.start(&mut events));
        assert!(!lap.start(&mut events));

        for _ in 0..40 {
            lap.tick(0.1, &mut events);
        }
        assert_eq!(
            events,
            vec![
                RaceEvent::CountdownSecond(3),
                RaceEvent::CountdownSecond(2),
                RaceEvent::CountdownSecond(1),
                RaceEvent::RaceStarted,
            ]
        );
        assert_eq!(lap.get_laps_completed(), 0);
        assert_eq!(lap.get_current_checkpoint(), 1);
        let visible: Vec<usize> = lap.get_ring().iter().filter(|g| g.visible).map(|g| g.index).collect();
        assert_eq!(visible, vec![1]);
    }

    #[test]
    fn test_lingering_advances_once() {
        let mut lap = racing(3);
        let mut events = Vec::new();
        for _ in 0..50 {
            lap.evaluate(&at_gate(1), &mut events);
        }
        assert_eq!(lap.get_current_checkpoint(), 2);
        assert_eq!(events, vec![RaceEvent::CheckpointCrossed { index: 1 }]);
    }

    #[test]
    fn test_only_current_gate_counts() {
        let mut lap = racing(3);
        let mut events = Vec::new();
        lap.evaluate(&at_gate(3), &mut events);
        assert_eq!(lap.get_current_checkpoint(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_third_lap_finishes_and_stops_clock() {
        let mut lap = racing(3);
        let mut events = Vec::new();
        for _ in 0..3 {
            for gate in [1, 2, 3, 0] {
                lap.tick(1.0, &mut events);
                lap.evaluate(&at_gate(gate), &mut events);
                lap.evaluate(&away(), &mut events);
            }
        }
        assert_eq!(lap.get_phase(), RacePhase::Finished);
        assert_eq!(lap.get_laps_completed(), 3);
        assert_eq!(lap.get_splits(), &[4.0, 4.0, 4.0]);
        assert_eq!(lap.get_best_lap(), Some(4.0));
        assert_eq!(events.last(), Some(&RaceEvent::RaceFinished { total_time: 12.0 }));

        let total = lap.get_total_elapsed();
        lap.tick(5.0, &mut events);
        lap.evaluate(&at_gate(1), &mut events);
        assert_eq!(lap.get_total_elapsed(), total);
        assert_eq!(lap.get_laps_completed(), 3);
        assert!(lap.get_ring().iter().all(|g| !g.visible));
    }

    #[test]
    fn test_best_lap_tracks_fastest() {
        let mut lap = racing(5);
        let mut events = Vec::new();
        for seconds in [3.0, 2.0, 4.0] {
            for gate in [1, 2, 3, 0] {
                lap.tick(seconds / 4.0, &mut events);
                lap.evaluate(&at_gate(gate), &mut events);
                lap.evaluate(&away(), &mut events);
            }
        }
        assert_eq!(lap.get_best_lap(), Some(2.0));
        assert_eq!(lap.get_last_crossed(), Some(0));
    }

    #[test]
    fn test_reset_returns_to_not_started() {
        let mut lap = racing(3);
        let mut events = Vec::new();
        lap.evaluate(&at_gate(1), &mut events);
        lap.reset();
        assert_eq!(lap.get_phase(), RacePhase::NotStarted);
        assert_eq!(lap.get_laps_completed(), -1);
        assert!(lap.get_last_crossed().is_none());
        assert!(lap.start(&mut events));
    }
}
