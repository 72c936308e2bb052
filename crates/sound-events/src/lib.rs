//! Shared sound event types for the sound propagation engine.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the engine crate and for anything that produces
//! or displays sounds.

pub mod event;
pub mod marker;
pub mod point;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export point types
pub use point::{Direction, Tripoint};

// Re-export event types
pub use event::{AudioCue, Severity, SoundCategory, SoundEvent};

// Re-export marker types
pub use marker::{Marker, UNKNOWN_SOUND};
