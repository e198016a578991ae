//! Race context
//!
//! Owns the physics world and every subsystem of one race and runs them in
//! a fixed order each tick. The host creates one context per race, calls
//! [`RaceContext::tick`] once per frame and renders the returned snapshot.
//!
//! # Tick order
//!
//! 1. Lap timers (countdown / lap clock)
//! 2. Vehicle update (drains last step's contacts, writes the body)
//! 3. Hazard sway, once
//! 4. Physics step
//! 5. Footprint from the stepped pose
//! 6. Track bounds, hazard zones and the current gate against the footprint
//! 7. Hazard timers (they scale the next tick's handling)
//! 8. Ghost record, commit on lap completion, playback
//! 9. Snapshot

use glam::{Quat, Vec3};

use super::snapshot::RaceSnapshot;
use crate::config::RaceConfig;
use crate::error::TrackLoadError;
use crate::ghost::{GhostPlayer, GhostRecorder};
use crate::hazard::HazardLayer;
use crate::physics::PhysicsWorld;
use crate::track::{LapState, RaceEvent, RacePhase, Track, TrackDefinition, VehicleFootprint};
use crate::vehicle::{DriverIntent, Vehicle, VehicleContext};

/// One race on one track with one car.
#[derive(Debug)]
pub struct RaceContext<W: PhysicsWorld> {
    world: W,
    config: RaceConfig,
    track: Track,
    vehicle: Vehicle,
    lap: LapState,
    hazards: HazardLayer,
    recorder: GhostRecorder,
    ghost: GhostPlayer,
    /// Ticks run so far
    tick: u64,
    /// Result of the last bounds evaluation
    inside_track: bool,
    /// Events raised outside `tick` (e.g. by `start`), delivered with the next snapshot
    pending_events: Vec<RaceEvent>,
}

impl<W: PhysicsWorld> RaceContext<W> {
    /// Load the track into `world` and spawn the car at the start pose.
    pub fn new(mut world: W, config: RaceConfig, definition: &TrackDefinition) -> Result<Self, TrackLoadError> {
        let mut track = Track::load(&mut world, definition)?;

        let (start_position, start_rotation) = track.get_start_pose();
        let vehicle = match Vehicle::spawn(&mut world, config.vehicle.clone(), start_position, start_rotation) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                track.teardown(&mut world);
                return Err(e.into());
            }
        };

        let mut lap_config = config.lap.clone();
        if let Some(total_laps) = track.get_total_laps() {
            lap_config.total_laps = total_laps;
        }
        let lap = LapState::new(track.get_checkpoints().clone(), lap_config);
        let period = config.ghost.period();

        Ok(Self {
            world,
            hazards: HazardLayer::new(config.hazard.clone()),
            recorder: GhostRecorder::new(config.ghost.clone()),
            ghost: GhostPlayer::new(period),
            config,
            track,
            vehicle,
            lap,
            tick: 0,
            inside_track: true,
            pending_events: Vec::new(),
        })
    }

    /// Begin the countdown. Returns false if the race was already started.
    pub fn start(&mut self) -> bool {
        self.lap.start(&mut self.pending_events)
    }

    /// Advance the race by `dt` seconds. Non-positive or non-finite `dt`
    /// changes nothing and returns the current snapshot.
    pub fn tick(&mut self, dt: f32, intent: &DriverIntent) -> RaceSnapshot {
        if !dt.is_finite() || dt <= 0.0 {
            return self.snapshot();
        }
        self.tick += 1;
        let mut events = std::mem::take(&mut self.pending_events);

        self.lap.tick(dt, &mut events);

        let ctx = VehicleContext {
            race_started: self.lap.get_phase().is_racing(),
            inside_track: self.inside_track,
            handling: self.hazards.handling(),
            bounce_factors: self.track.get_bounce_factors(),
        };
        self.vehicle.update(&mut self.world, intent, &ctx, dt);

        if let Some(body) = self.vehicle.get_body() {
            self.hazards
                .apply_sway(&mut self.world, body, self.vehicle.get_speed(), dt, self.tick);
        }

        self.world.step(dt);

        let was_racing = self.lap.get_phase().is_racing();
        let pose = self
            .vehicle
            .get_position(&self.world)
            .zip(self.vehicle.get_rotation(&self.world));
        if let Some((position, rotation)) = pose {
            let footprint = VehicleFootprint::new(position, rotation, self.vehicle.get_config().half_extents);
            self.inside_track = self.track.evaluate_bounds(&footprint);
            self.track.evaluate_hazards(&footprint);
            self.lap.evaluate(&footprint, &mut events);

            if was_racing {
                self.recorder
                    .record(dt, position, rotation, self.lap.get_current_checkpoint());
            }
        }

        let track = &self.track;
        self.hazards.update_timers(|kind| track.is_in_hazard(kind), dt);

        // The last lap keeps replaying after the finish
        if was_racing || self.lap.get_phase() == RacePhase::Finished {
            self.ghost.advance(dt);
        }
        if events.iter().any(|e| matches!(e, RaceEvent::LapCompleted { .. })) {
            let lap = self.recorder.commit();
            self.ghost.load(lap);
        }

        self.snapshot_with(events)
    }

    /// Put the car back on the last crossed gate (or the start line if none
    /// was crossed yet), facing the next gate.
    pub fn respawn_at_last_checkpoint(&mut self) -> bool {
        let height = self.vehicle.get_config().half_extents.y;
        let pose = match self.lap.get_last_crossed() {
            Some(index) => self.track.gate_pose(index, height),
            None => Some(self.track.get_start_pose()),
        };
        let Some((position, rotation)) = pose else {
            return false;
        };
        if self.vehicle.get_body().is_none() {
            return false;
        }
        self.vehicle.respawn(&mut self.world, position, rotation);
        self.hazards.clear();
        true
    }

    /// Abort the race: back to the start line, nothing started.
    pub fn reset(&mut self) {
        self.lap.reset();
        self.recorder.reset();
        self.ghost.clear();
        self.hazards.clear();
        self.pending_events.clear();
        let (position, rotation) = self.track.get_start_pose();
        self.vehicle.respawn(&mut self.world, position, rotation);
        self.vehicle.enter();
        self.inside_track = true;
    }

    /// Destroy every body this race created and hand the world back.
    pub fn teardown(mut self) -> W {
        self.vehicle.teardown(&mut self.world);
        self.track.teardown(&mut self.world);
        log::debug!("race torn down after {} ticks", self.tick);
        self.world
    }

    /// Current state without advancing anything.
    pub fn snapshot(&self) -> RaceSnapshot {
        self.snapshot_with(Vec::new())
    }

    fn snapshot_with(&self, events: Vec<RaceEvent>) -> RaceSnapshot {
        let (start_position, start_rotation) = self.track.get_start_pose();
        let state = self.vehicle.get_state();
        let rotation = self.vehicle.get_rotation(&self.world).unwrap_or(start_rotation);

        RaceSnapshot {
            position: self.vehicle.get_position(&self.world).unwrap_or(start_position),
            rotation,
            visual_rotation: self.vehicle.get_visual_rotation(&self.world).unwrap_or(rotation),
            speed: state.speed,
            steer: state.steer,
            drift_factor: state.drift.factor,
            drifting: state.drift.active,
            occupied: state.occupied,
            phase: self.lap.get_phase(),
            current_checkpoint: self.lap.get_current_checkpoint(),
            laps_completed: self.lap.get_laps_completed(),
            total_laps: self.lap.get_total_laps(),
            lap_elapsed: self.lap.get_lap_elapsed(),
            total_elapsed: self.lap.get_total_elapsed(),
            best_lap: self.lap.get_best_lap(),
            inside_track: self.inside_track,
            inside_hazard: self.track.is_in_any_hazard(),
            ghost: self.ghost.pose(),
            events,
        }
    }

    // ========================================================================
    // GETTERS
    // ========================================================================

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Direct world access for host-side tweaks (gravity, materials).
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn get_config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn get_track(&self) -> &Track {
        &self.track
    }

    pub fn get_vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Mutable vehicle access, e.g. to re-enter after an exit.
    pub fn get_vehicle_mut(&mut self) -> &mut Vehicle {
        &mut self.vehicle
    }

    pub fn get_lap(&self) -> &LapState {
        &self.lap
    }

    pub fn get_hazards(&self) -> &HazardLayer {
        &self.hazards
    }

    pub fn get_recorder(&self) -> &GhostRecorder {
        &self.recorder
    }

    pub fn get_ghost(&self) -> &GhostPlayer {
        &self.ghost
    }

    pub fn get_tick(&self) -> u64 {
        self.tick
    }

    pub fn get_phase(&self) -> RacePhase {
        self.lap.get_phase()
    }

    pub fn get_start_pose(&self) -> (Vec3, Quat) {
        self.track.get_start_pose()
    }
}
