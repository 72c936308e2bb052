//! Spatial Sound Engine Library
//!
//! Collects the sounds emitted each tick, clusters them for the agents that
//! react, and resolves them individually for the listening character.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod ambience;
pub mod backends;
pub mod clustering;
pub mod collaborators;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod listener;
pub mod markers;
pub mod perception;
pub mod sink;
pub mod snapshot;
pub mod systems;

pub use config::SoundConfig;
pub use engine::SoundEngine;
pub use error::{ConfigError, SoundError};
pub use listener::ListenerState;
pub use perception::Outcome;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
