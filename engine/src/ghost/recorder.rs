//! Ghost recorder
//!
//! Samples the car pose at a fixed period while racing. Frame deltas are
//! accumulated and the remainder carries over after each sample, so the
//! sample count depends only on total recorded time, not on how it was
//! split into frames.

use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Default sampling period in seconds
pub const GHOST_FREQUENCY: f32 = 0.1;

/// Upper bound on samples kept for one lap (an hour at the default period)
pub const MAX_GHOST_SAMPLES: usize = 36_000;

/// Slack for accumulated float error when comparing against the period.
const ACCUMULATOR_EPSILON: f64 = 1e-6;

/// Ghost settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    pub enabled: bool,
    /// Sampling period (seconds)
    pub frequency: f32,
    pub max_samples: usize,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: GHOST_FREQUENCY,
            max_samples: MAX_GHOST_SAMPLES,
        }
    }
}

impl GhostConfig {
    /// Sampling period actually used; invalid values fall back to the default.
    pub fn period(&self) -> f32 {
        if self.frequency.is_finite() && self.frequency > 0.0 {
            self.frequency
        } else {
            GHOST_FREQUENCY
        }
    }
}

/// One recorded pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostSample {
    /// Position of this sample in its lap buffer
    pub index: usize,
    /// Lap time when captured (seconds)
    pub time: f32,
    pub position: Vec3,
    pub rotation: Quat,
    /// Checkpoint the car was heading for
    pub checkpoint: usize,
}

#[derive(Debug, Clone)]
pub struct GhostRecorder {
    config: GhostConfig,
    buffer: Vec<GhostSample>,
    accumulator: f32,
    /// Recorded time in the current buffer
    elapsed: f32,
}

impl GhostRecorder {
    pub fn new(config: GhostConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    /// Accumulate `dt` and take as many samples as periods elapsed.
    /// Returns the number of samples taken.
    pub fn record(&mut self, dt: f32, position: Vec3, rotation: Quat, checkpoint: usize) -> usize {
        if !self.config.enabled || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let period = f64::from(self.config.period());
        self.accumulator += dt;
        self.elapsed += dt;

        // Every period due this call, counted in one step
        let accumulator = f64::from(self.accumulator);
        let due = ((accumulator + ACCUMULATOR_EPSILON) / period).floor();
        if due < 1.0 {
            return 0;
        }
        self.accumulator = (accumulator - due * period).max(0.0) as f32;

        let room = self.config.max_samples.saturating_sub(self.buffer.len());
        let taken = due.min(room as f64) as usize;
        let elapsed = f64::from(self.elapsed);
        let first_due = elapsed - accumulator;
        for k in 1..=taken {
            self.buffer.push(GhostSample {
                index: self.buffer.len(),
                time: (first_due + k as f64 * period).min(elapsed) as f32,
                position,
                rotation,
                checkpoint,
            });
        }
        taken
    }

    /// Hand over the finished lap and start an empty buffer. The
    /// accumulator keeps its remainder.
    pub fn commit(&mut self) -> Arc<[GhostSample]> {
        let samples: Arc<[GhostSample]> = std::mem::take(&mut self.buffer).into();
        self.elapsed = self.accumulator;
        log::debug!("ghost lap committed with {} samples", samples.len());
        samples
    }

    /// Drop everything recorded (race reset).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.accumulator = 0.0;
        self.elapsed = 0.0;
    }

    pub fn samples(&self) -> &[GhostSample] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get_config(&self) -> &GhostConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_ticks(recorder: &mut GhostRecorder, ticks: usize, dt: f32) {
        for i in 0..ticks {
            recorder.record(dt, Vec3::new(0.0, 0.0, i as f32), Quat::IDENTITY, 1);
        }
    }

    #[test]
    fn test_ten_samples_from_twenty_one_ticks() {
        let mut recorder = GhostRecorder::new(GhostConfig::default());
        record_ticks(&mut recorder, 21, 0.05);
        assert_eq!(recorder.len(), 10);
        let indices: Vec<usize> = recorder.samples().iter().map(|s| s.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_count_independent_of_partition() {
        for &dt in &[0.017_f32, 0.03, 0.07, 0.25] {
            let mut recorder = GhostRecorder::new(GhostConfig::default());
            let ticks = (2.0 / dt).round() as usize;
            record_ticks(&mut recorder, ticks, dt);
            let expected = ((ticks as f32 * dt) / GHOST_FREQUENCY + 1e-4).floor() as usize;
            assert_eq!(recorder.len(), expected, "dt {dt}");
        }
    }

    #[test]
    fn test_commit_starts_new_buffer_and_keeps_remainder() {
        let mut recorder = GhostRecorder::new(GhostConfig::default());
        record_ticks(&mut recorder, 3, 0.05);
        let lap = recorder.commit();
        assert_eq!(lap.len(), 1);
        assert!(recorder.is_empty());

        // 0.05 carried over: one more tick completes a period
        record_ticks(&mut recorder, 1, 0.05);
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.samples()[0].index, 0);
    }

    #[test]
    fn test_disabled_recorder_records_nothing() {
        let mut recorder = GhostRecorder::new(GhostConfig {
            enabled: false,
            ..Default::default()
        });
        record_ticks(&mut recorder, 100, 0.05);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_sample_times_do_not_drift() {
        let dt = 0.05;
        let mut recorder = GhostRecorder::new(GhostConfig::default());
        record_ticks(&mut recorder, 400, dt);
        assert_eq!(recorder.len(), 200);
        for (k, sample) in recorder.samples().iter().enumerate() {
            let expected = GHOST_FREQUENCY * (k + 1) as f32;
            assert!((sample.time - expected).abs() <= dt, "sample {k} at {}", sample.time);
        }
    }

    #[test]
    fn test_huge_dt_returns_with_capped_buffer() {
        let mut recorder = GhostRecorder::new(GhostConfig {
            max_samples: 50,
            ..Default::default()
        });
        let taken = recorder.record(1.0e7, Vec3::ZERO, Quat::IDENTITY, 0);
        assert_eq!(taken, 50);
        assert_eq!(recorder.len(), 50);

        // Nothing left over to flush on the next small tick
        assert_eq!(recorder.record(0.01, Vec3::ZERO, Quat::IDENTITY, 0), 0);
    }

    #[test]
    fn test_buffer_is_capped() {
        let mut recorder = GhostRecorder::new(GhostConfig {
            max_samples: 5,
            ..Default::default()
        });
        record_ticks(&mut recorder, 40, 0.05);
        assert_eq!(recorder.len(), 5);
    }
}
