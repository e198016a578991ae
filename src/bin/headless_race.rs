//! Headless Race - Scripted driver on a track, no window
//!
//! Run with: `cargo run --bin headless_race [track.json] [config.json]`
//!
//! Without a track file a built-in square circuit is used. The scripted
//! driver holds the throttle and steers at the next gate using the
//! camera-relative steering model. Set `RUST_LOG=debug` to see lap and
//! hazard logging from the core.

use std::error::Error;
use std::fs;

use arcade_racer_engine::physics::types::wrap_angle;
use arcade_racer_engine::track::HazardZoneDescriptor;
use arcade_racer_engine::{
    ArcadeWorld, DriverIntent, HazardKind, RaceConfig, RaceContext, RaceEvent, RacePhase, TrackDefinition,
};
use glam::{Quat, Vec3};

const DT: f32 = 1.0 / 60.0;

/// Give up after ten simulated minutes.
const MAX_TICKS: u64 = 60 * 60 * 10;

fn main() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::Builder::from_default_env().try_init();

    let mut args = std::env::args().skip(1);
    let definition = match args.next() {
        Some(path) => TrackDefinition::from_json(&fs::read_to_string(&path)?)?,
        None => square_circuit(),
    };
    let config = match args.next() {
        Some(path) => RaceConfig::from_json(&fs::read_to_string(&path)?)?,
        None => RaceConfig::default(),
    };

    let world = ArcadeWorld::new(config.physics.clone());
    let mut race = RaceContext::new(world, config, &definition)?;
    println!(
        "Track loaded: {} gates, {} obstacles, {} laps",
        race.get_track().get_checkpoints().len(),
        race.get_track().get_obstacles().len(),
        race.get_lap().get_total_laps()
    );

    race.start();
    while race.get_tick() < MAX_TICKS {
        let intent = scripted_intent(&race);
        let snapshot = race.tick(DT, &intent);
        for event in &snapshot.events {
            report(event);
        }
        if snapshot.phase == RacePhase::Finished {
            break;
        }
    }

    let snapshot = race.snapshot();
    if snapshot.phase != RacePhase::Finished {
        println!(
            "Stopped after {} ticks: {} laps, heading for gate {} at {:.1} m/s",
            race.get_tick(),
            snapshot.laps_completed.max(0),
            snapshot.current_checkpoint,
            snapshot.speed
        );
    }
    if let Some(best) = snapshot.best_lap {
        println!("Best lap {best:.3}s");
    }

    race.teardown();
    Ok(())
}

/// Throttle on, camera pointed at the next gate.
fn scripted_intent(race: &RaceContext<ArcadeWorld>) -> DriverIntent {
    let snapshot = race.snapshot();
    let target = race
        .get_track()
        .get_checkpoints()
        .get(snapshot.current_checkpoint)
        .map(|gate| gate.center())
        .unwrap_or(snapshot.position);
    let to_target = target - snapshot.position;
    let heading = to_target.x.atan2(to_target.z);

    DriverIntent {
        forward: true,
        camera_heading: wrap_angle(heading),
        absolute_steering: true,
        ..Default::default()
    }
}

fn report(event: &RaceEvent) {
    match event {
        RaceEvent::CountdownSecond(second) => println!("{second}..."),
        RaceEvent::RaceStarted => println!("Go!"),
        RaceEvent::CheckpointCrossed { index } => log::info!("checkpoint {index}"),
        RaceEvent::LapCompleted { lap, time } => println!("Lap {lap}: {time:.3}s"),
        RaceEvent::RaceFinished { total_time } => println!("Finished in {total_time:.3}s"),
    }
}

/// 120 m square with a gate on each side and an oil patch on the back
/// straight.
fn square_circuit() -> TrackDefinition {
    let half = 60.0;
    let outer = half + 20.0;
    TrackDefinition {
        bounds: vec![vec![
            Vec3::new(-outer, 0.0, -outer),
            Vec3::new(outer, 0.0, -outer),
            Vec3::new(outer, 0.0, outer),
            Vec3::new(-outer, 0.0, outer),
        ]],
        hazards: vec![HazardZoneDescriptor {
            kind: HazardKind::Oil.to_string(),
            points: vec![
                Vec3::new(-10.0, 0.0, half - 6.0),
                Vec3::new(10.0, 0.0, half - 6.0),
                Vec3::new(10.0, 0.0, half + 6.0),
                Vec3::new(-10.0, 0.0, half + 6.0),
            ],
        }],
        start_position: Vec3::new(-half, 0.5, -10.0),
        start_rotation: Quat::IDENTITY,
        ..Default::default()
    }
    .with_gate(0, Vec3::new(-half - 8.0, 0.0, 0.0), Vec3::new(-half + 8.0, 0.0, 0.0))
    .with_gate(1, Vec3::new(0.0, 0.0, half - 8.0), Vec3::new(0.0, 0.0, half + 8.0))
    .with_gate(2, Vec3::new(half - 8.0, 0.0, 0.0), Vec3::new(half + 8.0, 0.0, 0.0))
    .with_gate(3, Vec3::new(0.0, 0.0, -half - 8.0), Vec3::new(0.0, 0.0, -half + 8.0))
}
