//! Configuration System
//!
//! Loads tuning parameters from a TOML file so thresholds can be adjusted
//! without recompiling. Every section falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Clustering of agent-cadence sounds
    #[serde(default)]
    pub clustering: ClusteringConfig,
    /// Agent reactions and region signals
    #[serde(default)]
    pub reaction: ReactionConfig,
    /// Hearing damage
    #[serde(default)]
    pub deafness: DeafnessConfig,
    /// Waking sleeping listeners
    #[serde(default)]
    pub sleep: SleepConfig,
    /// Listener distance model
    #[serde(default)]
    pub listener: ListenerConfig,
    /// Audio back-end levels
    #[serde(default)]
    pub audio: AudioConfig,
}

impl SoundConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Clustering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Lower bound on the number of clusters once there are more events than this
    pub min_clusters: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self { min_clusters: 10 }
    }
}

/// Agent reaction and region signal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Volume a cluster needs before the world layer is signalled
    pub alert_threshold: i32,
    /// Region signals are only sent on ticks divisible by this
    pub signal_cadence_ticks: u64,
    /// Width of a coarse region in tiles
    pub region_size: i32,
    /// Volume divisor per elevation layer below ground
    pub underground_divisor: i32,
    /// Lowest signal strength once the threshold is passed
    pub min_signal: i32,
    /// Highest signal strength
    pub max_signal: i32,
    /// Wander duration multiplier for agents with enhanced hearing
    pub enhanced_wander_multiplier: i32,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 60,
            signal_cadence_ticks: 5,
            region_size: 12,
            underground_divisor: 2,
            min_signal: 8,
            max_signal: 26,
            enhanced_wander_multiplier: 6,
        }
    }
}

/// Hearing damage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeafnessConfig {
    /// A roll between half the felt volume and the felt volume must reach this
    pub loudness_threshold: i32,
    /// Felt volume above this adds deafness
    pub duration_offset: i32,
    /// Divisor for new deafness
    pub onset_divisor: i32,
    /// Divisor for deafness added to an already deaf listener
    pub prolong_divisor: i32,
    /// Cap on a single prolongation, in turns
    pub prolong_cap_turns: u32,
    /// Cap on total deafness, in turns
    pub max_deafness_turns: u32,
}

impl Default for DeafnessConfig {
    fn default() -> Self {
        Self {
            loudness_threshold: 150,
            duration_offset: 130,
            onset_divisor: 4,
            prolong_divisor: 8,
            prolong_cap_turns: 240,
            max_deafness_turns: 2400,
        }
    }
}

/// Sleep interruption settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepConfig {
    pub dice_sides: u32,
    /// Dice rolled for an ordinary sleeper
    pub normal_dice: u32,
    /// Dice rolled for a heavy sleeper
    pub heavy_dice: u32,
    /// Dice rolled for a very heavy sleeper
    pub very_heavy_dice: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            dice_sides: 15,
            normal_dice: 2,
            heavy_dice: 3,
            very_heavy_dice: 6,
        }
    }
}

/// Listener distance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Tiles of distance added per elevation layer between listener and source
    pub vertical_distance_factor: i32,
    /// Sounds this close feed the listener's volume meter
    pub meter_radius: i32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            vertical_distance_factor: 10,
            meter_radius: 1,
        }
    }
}

/// Audio back-end levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master effects volume, 1.0 = unchanged
    pub volume_multiplier: f32,
    /// Playback volume lost per tile of distance (out of 100)
    pub falloff_per_tile: f32,
    /// Fade used when switching ambient loops
    pub ambient_fade_ms: u32,
    /// Fade used when muting everything for sleep
    pub sleep_fade_ms: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume_multiplier: 1.0,
            falloff_per_tile: 4.166_666,
            ambient_fade_ms: 1000,
            sleep_fade_ms: 300,
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Sound Engine Configuration

[clustering]
# Sounds are clustered into max(min_clusters, ceil(ln N)) groups
min_clusters = 10

[reaction]
alert_threshold = 60
signal_cadence_ticks = 5
region_size = 12
underground_divisor = 2
min_signal = 8
max_signal = 26
enhanced_wander_multiplier = 6

[deafness]
loudness_threshold = 150
duration_offset = 130
onset_divisor = 4
prolong_divisor = 8
prolong_cap_turns = 240
max_deafness_turns = 2400

[sleep]
dice_sides = 15
normal_dice = 2
heavy_dice = 3
very_heavy_dice = 6

[listener]
vertical_distance_factor = 10
meter_radius = 1

[audio]
volume_multiplier = 1.0
falloff_per_tile = 4.166666
ambient_fade_ms = 1000
sleep_fade_ms = 300
"#
    .to_string()
}
