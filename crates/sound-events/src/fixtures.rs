//! Sample data fixtures for testing.
//!
//! This module provides ready-made sound scenes for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // sound-events = { path = "../sound-events", features = ["test-fixtures"] }
//!
//! use sound_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! ```

use crate::{SoundCategory, SoundEvent, Tripoint};

/// Returns sample events from the fixtures file.
///
/// Contains 10 events across a 50x50 area:
/// - 2 combat sounds (explosion, gunshot) with audio cues
/// - 2 footsteps
/// - 1 ambient sound
/// - 1 underground crash
/// - 1 upstairs activity
/// - 3 other described sounds
pub fn sample_events() -> Vec<SoundEvent> {
    let jsonl = include_str!("../tests/fixtures/sample_sounds.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).unwrap_or_else(|e| {
                panic!("Failed to parse sound line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// A non-ambient bang with no audio cue.
pub fn loud_bang(position: Tripoint, volume: i32) -> SoundEvent {
    SoundEvent::new(position, volume, SoundCategory::Combat).with_description("a loud bang")
}

/// One loud source surrounded by faint ones at the same position.
pub fn whisper_beside_gunshot(position: Tripoint) -> Vec<SoundEvent> {
    let mut events = vec![SoundEvent::new(position, 100, SoundCategory::Combat)
        .with_description("a gunshot")];
    events.extend(
        (0..9).map(|_| SoundEvent::new(position, 1, SoundCategory::Speech).with_description("a whisper")),
    );
    events
}

/// A deafening blast, loud enough to deafen anyone standing within a few tiles.
pub fn deafening_blast(position: Tripoint) -> SoundEvent {
    SoundEvent::new(position, 400, SoundCategory::Combat)
        .with_description("a huge explosion!")
        .with_cue("explosion", "huge")
}
