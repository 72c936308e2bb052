//! Error Types
//!
//! Nothing in the engine is fatal to the simulation; these errors mark input
//! that was dropped or an effect that could not be produced.

use thiserror::Error;

/// Errors raised at the sink boundary and by the audio back-end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundError {
    /// A producer emitted a sound with negative volume
    #[error("negative sound volume {volume}")]
    NegativeVolume { volume: i32 },
    /// The audio back-end has no asset for a cue
    #[error("no audio asset for {id}/{variant}")]
    MissingAsset { id: String, variant: String },
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
