//! Ghost playback
//!
//! Replays a committed lap. The cursor is `floor(elapsed / period)` clamped
//! to the last sample; the pose between two samples is interpolated.

use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::Serialize;

use super::recorder::GhostSample;

/// Interpolated ghost pose for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GhostPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub checkpoint: usize,
}

#[derive(Debug, Clone)]
pub struct GhostPlayer {
    samples: Arc<[GhostSample]>,
    period: f32,
    elapsed: f32,
    playing: bool,
}

impl GhostPlayer {
    pub fn new(period: f32) -> Self {
        Self {
            samples: Arc::from(Vec::new()),
            period,
            elapsed: 0.0,
            playing: false,
        }
    }

    /// Replace the buffer and play it from the start.
    pub fn load(&mut self, samples: Arc<[GhostSample]>) {
        self.playing = !samples.is_empty();
        self.samples = samples;
        self.elapsed = 0.0;
    }

    /// Advance playback. Reaching the last sample stops it.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        if self.position_in_buffer() >= self.last_index() as f32 {
            self.playing = false;
            log::trace!("ghost playback finished");
        }
    }

    /// Sample index under the playhead.
    pub fn cursor(&self) -> usize {
        (self.position_in_buffer().floor() as usize).min(self.last_index())
    }

    /// Interpolated pose, or `None` when nothing is playing.
    pub fn pose(&self) -> Option<GhostPose> {
        if !self.playing {
            return None;
        }
        let cursor = self.cursor();
        let current = self.samples.get(cursor)?;
        let Some(next) = self.samples.get(cursor + 1) else {
            return Some(pose_of(current));
        };

        let t = (self.position_in_buffer() - cursor as f32).clamp(0.0, 1.0);
        Some(GhostPose {
            position: current.position.lerp(next.position, t),
            rotation: current.rotation.slerp(next.rotation, t),
            checkpoint: current.checkpoint,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Empty buffers count as finished.
    pub fn is_finished(&self) -> bool {
        !self.playing
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stop and drop the buffer.
    pub fn clear(&mut self) {
        self.samples = Arc::from(Vec::new());
        self.elapsed = 0.0;
        self.playing = false;
    }

    fn position_in_buffer(&self) -> f32 {
        if self.period > 0.0 { self.elapsed / self.period } else { 0.0 }
    }

    fn last_index(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }
}

fn pose_of(sample: &GhostSample) -> GhostPose {
    GhostPose {
        position: sample.position,
        rotation: sample.rotation,
        checkpoint: sample.checkpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(n: usize) -> Arc<[GhostSample]> {
        (0..n)
            .map(|i| GhostSample {
                index: i,
                time: i as f32 * 0.1,
                position: Vec3::new(0.0, 0.0, i as f32),
                rotation: Quat::IDENTITY,
                checkpoint: 0,
            })
            .collect()
    }

    #[test]
    fn test_cursor_follows_elapsed_time() {
        let mut player = GhostPlayer::new(0.1);
        player.load(lap(10));
        player.advance(0.25);
        assert_eq!(player.cursor(), 2);
        let pose = player.pose().unwrap();
        assert!((pose.position.z - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_playback_stops_at_end() {
        let mut player = GhostPlayer::new(0.1);
        player.load(lap(5));
        for _ in 0..100 {
            player.advance(0.05);
        }
        assert!(player.is_finished());
        assert_eq!(player.cursor(), 4);
        assert!(player.pose().is_none());
    }

    #[test]
    fn test_empty_buffer_is_finished() {
        let mut player = GhostPlayer::new(0.1);
        player.load(lap(0));
        player.advance(1.0);
        assert!(player.is_finished());
        assert_eq!(player.cursor(), 0);
        assert!(player.pose().is_none());
    }

    #[test]
    fn test_reload_restarts() {
        let mut player = GhostPlayer::new(0.1);
        player.load(lap(3));
        player.advance(1.0);
        assert!(player.is_finished());
        player.load(lap(3));
        assert!(player.is_playing());
        assert_eq!(player.cursor(), 0);
    }
}
