//! External Collaborators
//!
//! Interfaces to the systems the engine drives but does not own: audio
//! playback, the message log, terrain and sight queries, the agent behavior
//! layer, and the coarse world layer. In-memory implementations live in
//! [`crate::backends`].

use serde::{Deserialize, Serialize};
use sound_events::{Severity, Tripoint};

use crate::ambience::{AmbientChannel, ChannelGroup};
use crate::error::SoundError;

/// Audio playback back-end. Playback is best effort.
pub trait AudioBackend {
    /// Plays a one-shot effect. `angle` is the compass bearing of the source.
    fn play_cue(&mut self, id: &str, variant: &str, volume: i32, angle: i32)
        -> Result<(), SoundError>;

    /// Starts a looping ambient track on a dedicated channel.
    fn play_ambient(
        &mut self,
        id: &str,
        variant: &str,
        volume: i32,
        channel: AmbientChannel,
        fade_ms: u32,
    ) -> Result<(), SoundError>;

    /// Plays the ringing tone for a freshly deafened listener.
    fn play_hearing_loss_cue(&mut self, duration_turns: u32);

    fn is_channel_playing(&self, channel: AmbientChannel) -> bool;

    /// Fades out every channel.
    fn fade_all(&mut self, fade_ms: u32);

    fn fade_group(&mut self, group: ChannelGroup, fade_ms: u32);
}

/// Where player-facing text goes.
pub trait MessageSurface {
    fn post_message(&mut self, severity: Severity, text: &str);
}

/// Sight and weather queries.
pub trait TerrainService {
    fn can_see(&self, observer: Tripoint, point: Tripoint) -> bool;

    /// Volume that the current weather drowns out.
    fn weather_attenuation(&self) -> i32;
}

/// Answer to a proposed activity interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptDecision {
    /// Stop the current activity
    Cancel,
    /// Keep going and stop asking about trivial noises
    Ignore,
}

/// Decides whether a noise cancels what the listener is doing.
pub trait ActivityArbiter {
    fn cancel_or_ignore(&mut self, query: &str) -> InterruptDecision;
}

/// How well an agent hears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingCapability {
    /// Cannot hear at all
    None,
    #[default]
    Normal,
    /// Hears twice as far and follows sounds longer
    Enhanced,
}

/// Stimulus delivered to the behavior layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Sound,
}

/// An agent that reacts to clustered sounds.
pub trait ReactiveAgent {
    fn position(&self) -> Tripoint;

    fn hearing(&self) -> HearingCapability;

    /// Scales urgency; 0 means the agent is effectively deaf.
    fn hearing_factor(&self) -> f32 {
        1.0
    }

    fn wander_to(&mut self, target: Tripoint, duration: u32);

    fn receive_trigger(&mut self, kind: TriggerKind, intensity: i32);
}

/// The coarse world layer that moves off-screen groups.
pub trait WorldSignals {
    fn signal_region(&mut self, coarse_point: Tripoint, strength: i32);
}
