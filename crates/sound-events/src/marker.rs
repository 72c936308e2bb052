//! Sound Markers
//!
//! Positions where the listener heard something it could not see.

use serde::{Deserialize, Serialize};

use crate::point::Tripoint;

/// Label used for sounds without a description.
pub const UNKNOWN_SOUND: &str = "a sound";

/// A "heard but not seen" position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Tripoint,
    #[serde(default)]
    pub description: String,
}

impl Marker {
    pub fn new(position: Tripoint, description: impl Into<String>) -> Self {
        Self {
            position,
            description: description.into(),
        }
    }

    /// Description for display, "a sound" when none was given.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            UNKNOWN_SOUND
        } else {
            &self.description
        }
    }
}
