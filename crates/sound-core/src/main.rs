//! Headless sound simulation
//!
//! Scatters noisy agents over an open field around one listener and runs the
//! sound systems for a number of ticks.

use bevy_ecs::prelude::*;
use clap::Parser;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sound_core::collaborators::HearingCapability;
use sound_core::config::{SoundConfig, DEFAULT_TUNING_PATH};
use sound_core::snapshot::{generate_snapshot, write_snapshot};
use sound_core::systems::{
    add_sound_systems, insert_sound_resources, GridPosition, Hearing, NoiseMaker, SoundTriggers,
    WanderGoal,
};
use sound_core::{ListenerState, SimRng, SoundEngine};
use sound_events::{SoundCategory, Tripoint};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "sound_sim")]
#[command(about = "Headless spatial sound simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Number of agents to spawn
    #[arg(long, default_value_t = 60)]
    agents: usize,

    /// Width of the square field in tiles
    #[arg(long, default_value_t = 50)]
    area: i32,

    /// Tuning file (defaults to tuning.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON snapshot here when the run ends
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

const NOISES: [(SoundCategory, &str, i32); 5] = [
    (SoundCategory::Speech, "someone talking", 8),
    (SoundCategory::Speech, "a shout", 20),
    (SoundCategory::Activity, "hammering", 15),
    (SoundCategory::Combat, "a gunshot", 60),
    (SoundCategory::Destructive, "breaking glass", 25),
];

fn load_config(path: Option<&Path>) -> SoundConfig {
    let path = match path {
        Some(p) => p,
        None if Path::new(DEFAULT_TUNING_PATH).exists() => Path::new(DEFAULT_TUNING_PATH),
        None => return SoundConfig::default(),
    };
    match SoundConfig::from_file(path) {
        Ok(config) => {
            info!("Loaded tuning from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Could not load {}: {}; using defaults", path.display(), e);
            SoundConfig::default()
        }
    }
}

fn spawn_agents(world: &mut World, count: usize, area: i32) {
    let Some(mut rng) = world.remove_resource::<SimRng>() else {
        return;
    };
    let area = area.max(1);
    for _ in 0..count {
        let position = Tripoint::new(rng.0.gen_range(0..area), rng.0.gen_range(0..area), 0);
        let (category, description, volume) = NOISES[rng.0.gen_range(0..NOISES.len())];
        let hearing = if rng.0.gen_bool(0.2) {
            HearingCapability::Enhanced
        } else {
            HearingCapability::Normal
        };
        world.spawn((
            GridPosition(position),
            Hearing {
                capability: hearing,
                factor: 1.0,
            },
            WanderGoal::default(),
            SoundTriggers::default(),
            NoiseMaker::new(volume, category, description).with_chance(0.05),
        ));
    }
    world.insert_resource(rng);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref());

    info!(
        seed = args.seed,
        ticks = args.ticks,
        agents = args.agents,
        area = args.area,
        "Starting sound simulation"
    );

    let mut world = World::new();
    insert_sound_resources(&mut world, config, args.seed);
    spawn_agents(&mut world, args.agents, args.area);
    let center = args.area / 2;
    world.spawn(ListenerState::new(Tripoint::new(center, center, 0)));

    let mut schedule = Schedule::default();
    add_sound_systems(&mut schedule);

    for tick in 0..args.ticks {
        schedule.run(&mut world);

        if tick % 20 == 0 {
            let wandering = world
                .query::<&WanderGoal>()
                .iter(&world)
                .filter(|g| g.is_active())
                .count();
            let markers = world.resource::<SoundEngine>().get_markers().len();
            info!(tick, wandering, markers, "tick summary");
        }
    }

    let mut listener_query = world.query::<&ListenerState>();
    if let Some(listener) = listener_query.iter(&world).next() {
        info!(
            deafness = listener.deafness_remaining,
            meter = listener.volume_meter,
            "Listener at {}",
            listener.position
        );
    }
    info!("Simulation complete. Ran {} ticks.", args.ticks);

    if let Some(path) = args.snapshot {
        let snapshot = generate_snapshot(&mut world);
        match write_snapshot(&snapshot, &path) {
            Ok(()) => info!("Wrote snapshot to {}", path.display()),
            Err(e) => warn!("Could not write snapshot to {}: {}", path.display(), e),
        }
    }
}
