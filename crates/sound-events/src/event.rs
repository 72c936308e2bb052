//! Sound Event Types
//!
//! A sound event is one noise emitted somewhere on the grid during a tick.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::point::Tripoint;

/// Broad kind of noise. Only used to tell ambient noise apart from
/// interruptive noise; the engine attaches no other meaning to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    /// Footsteps, doors, vehicles moving
    #[default]
    Movement,
    /// Shouting, talking, screaming
    Speech,
    /// Sirens, alarms, bells
    Alarm,
    /// Gunfire, explosions, melee impacts
    Combat,
    /// Background noise that never interrupts anyone
    Ambient,
    /// Tools and crafting
    Activity,
    /// Smashing and demolition
    Destructive,
    /// Radios, computers, speakers
    Electronic,
}

impl SoundCategory {
    /// Returns true if sounds of this category are background noise by default.
    pub fn is_background(self) -> bool {
        matches!(self, SoundCategory::Ambient)
    }
}

/// Identifies a playback asset for the audio back-end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioCue {
    pub id: String,
    pub variant: String,
}

impl AudioCue {
    pub fn new(id: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: variant.into(),
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.variant)
    }
}

/// One emitted sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub position: Tripoint,
    /// Loudness in tiles of reach. Negative values are rejected by the sinks.
    pub volume: i32,
    #[serde(default)]
    pub category: SoundCategory,
    /// Ambient sounds never interrupt the listener's activity
    #[serde(default)]
    pub is_ambient: bool,
    /// Footsteps only leave markers
    #[serde(default)]
    pub is_footstep: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_cue: Option<AudioCue>,
}

impl SoundEvent {
    pub fn new(position: Tripoint, volume: i32, category: SoundCategory) -> Self {
        Self {
            position,
            volume,
            category,
            is_ambient: category.is_background(),
            is_footstep: false,
            description: String::new(),
            audio_cue: None,
        }
    }

    /// A footstep: no description, no cue, never ambient.
    pub fn footstep(position: Tripoint, volume: i32) -> Self {
        Self {
            is_footstep: true,
            ..Self::new(position, volume, SoundCategory::Movement)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_ambient(mut self, ambient: bool) -> Self {
        self.is_ambient = ambient;
        self
    }

    pub fn with_cue(mut self, id: impl Into<String>, variant: impl Into<String>) -> Self {
        self.audio_cue = Some(AudioCue::new(id, variant));
        self
    }
}

/// Severity tag attached to messages for the message surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Neutral,
    Good,
    Bad,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Neutral => write!(f, "neutral"),
            Severity::Good => write!(f, "good"),
            Severity::Bad => write!(f, "bad"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Debug => write!(f, "debug"),
        }
    }
}
