//! Event Sink
//!
//! Append-only buffers of the sounds emitted since the last drain. Agents and
//! the listener are processed on different cadences, so each has its own buffer.

use serde::{Deserialize, Serialize};
use sound_events::{SoundEvent, Tripoint};

use crate::error::SoundError;

/// Position and loudness of one sound, all the clustering step needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noise {
    pub position: Tripoint,
    pub volume: i32,
}

impl Noise {
    pub fn new(position: Tripoint, volume: i32) -> Self {
        Self { position, volume }
    }
}

impl From<&SoundEvent> for Noise {
    fn from(event: &SoundEvent) -> Self {
        Self::new(event.position, event.volume)
    }
}

/// The two per-tick sound buffers.
#[derive(Debug, Default)]
pub struct SoundSink {
    agent_buffer: Vec<Noise>,
    listener_buffer: Vec<SoundEvent>,
}

impl SoundSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sound to both buffers.
    pub fn emit(&mut self, event: SoundEvent) -> Result<(), SoundError> {
        validate(&event)?;
        self.agent_buffer.push(Noise::from(&event));
        self.listener_buffer.push(event);
        Ok(())
    }

    /// Appends a sound to the listener buffer only.
    pub fn emit_listener_only(&mut self, event: SoundEvent) -> Result<(), SoundError> {
        validate(&event)?;
        self.listener_buffer.push(event);
        Ok(())
    }

    pub fn drain_agent_buffer(&mut self) -> Vec<Noise> {
        std::mem::take(&mut self.agent_buffer)
    }

    pub fn drain_listener_buffer(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.listener_buffer)
    }

    pub fn agent_buffer(&self) -> &[Noise] {
        &self.agent_buffer
    }

    pub fn listener_buffer(&self) -> &[SoundEvent] {
        &self.listener_buffer
    }

    pub fn clear(&mut self) {
        self.agent_buffer.clear();
        self.listener_buffer.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.agent_buffer.is_empty() && self.listener_buffer.is_empty()
    }
}

fn validate(event: &SoundEvent) -> Result<(), SoundError> {
    if event.volume < 0 {
        return Err(SoundError::NegativeVolume {
            volume: event.volume,
        });
    }
    Ok(())
}
