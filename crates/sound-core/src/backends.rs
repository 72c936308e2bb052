//! In-memory collaborators
//!
//! Recording implementations of the collaborator traits. The headless
//! driver runs on them and the tests inspect what they captured.

use std::collections::{BTreeSet, HashSet};

use bevy_ecs::prelude::*;
use serde::Serialize;
use sound_events::{Severity, Tripoint};
use tracing::{debug, info, warn};

use crate::ambience::{AmbientChannel, ChannelGroup, Weather};
use crate::collaborators::{
    ActivityArbiter, AudioBackend, InterruptDecision, MessageSurface, TerrainService, WorldSignals,
};
use crate::error::SoundError;

/// Resource: audio back-end that records playback instead of producing it.
#[derive(Resource, Debug, Default, Serialize)]
pub struct AudioLog {
    /// (id, variant, volume, angle)
    pub cues: Vec<(String, String, i32, i32)>,
    /// (id, variant, channel)
    pub ambient: Vec<(String, String, AmbientChannel)>,
    pub hearing_loss: Vec<u32>,
    /// Assets that fail to load
    #[serde(skip)]
    pub missing: HashSet<(String, String)>,
    pub playing: BTreeSet<AmbientChannel>,
    pub full_fades: usize,
}

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_asset(&self, id: &str, variant: &str) -> Result<(), SoundError> {
        if self.missing.contains(&(id.to_string(), variant.to_string())) {
            return Err(SoundError::MissingAsset {
                id: id.to_string(),
                variant: variant.to_string(),
            });
        }
        Ok(())
    }
}

impl AudioBackend for AudioLog {
    fn play_cue(
        &mut self,
        id: &str,
        variant: &str,
        volume: i32,
        angle: i32,
    ) -> Result<(), SoundError> {
        self.check_asset(id, variant)?;
        debug!(volume, angle, "cue {}/{}", id, variant);
        self.cues
            .push((id.to_string(), variant.to_string(), volume, angle));
        Ok(())
    }

    fn play_ambient(
        &mut self,
        id: &str,
        variant: &str,
        volume: i32,
        channel: AmbientChannel,
        fade_ms: u32,
    ) -> Result<(), SoundError> {
        self.check_asset(id, variant)?;
        debug!(volume, fade_ms, "ambient {}/{} on {:?}", id, variant, channel);
        self.ambient
            .push((id.to_string(), variant.to_string(), channel));
        self.playing.insert(channel);
        Ok(())
    }

    fn play_hearing_loss_cue(&mut self, duration_turns: u32) {
        self.hearing_loss.push(duration_turns);
        self.playing.insert(AmbientChannel::DeafnessTone);
    }

    fn is_channel_playing(&self, channel: AmbientChannel) -> bool {
        self.playing.contains(&channel)
    }

    fn fade_all(&mut self, _fade_ms: u32) {
        self.playing.clear();
        self.full_fades += 1;
    }

    fn fade_group(&mut self, group: ChannelGroup, _fade_ms: u32) {
        self.playing.retain(|channel| channel.group() != group);
    }
}

/// Resource: message surface that keeps every posted line.
#[derive(Resource, Debug, Default, Serialize)]
pub struct MessageLog {
    pub entries: Vec<(Severity, String)>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|(_, text)| text.clone()).collect()
    }
}

impl MessageSurface for MessageLog {
    fn post_message(&mut self, severity: Severity, text: &str) {
        match severity {
            Severity::Bad | Severity::Warning => warn!("{}", text),
            _ => info!("{}", text),
        }
        self.entries.push((severity, text.to_string()));
    }
}

/// Resource: flat open ground. Everything within `sight_radius` on the same
/// layer is visible except tiles marked hidden.
#[derive(Resource, Debug, Clone, Default)]
pub struct OpenTerrain {
    pub sight_radius: i32,
    pub hidden: HashSet<Tripoint>,
    pub weather: Weather,
}

impl OpenTerrain {
    pub fn new(sight_radius: i32) -> Self {
        Self {
            sight_radius,
            ..Default::default()
        }
    }
}

impl TerrainService for OpenTerrain {
    fn can_see(&self, observer: Tripoint, point: Tripoint) -> bool {
        observer.z == point.z
            && !self.hidden.contains(&point)
            && observer.planar_distance(point) <= self.sight_radius
    }

    fn weather_attenuation(&self) -> i32 {
        self.weather.sound_attenuation()
    }
}

/// Resource: activity arbiter that always answers the same way and keeps the
/// questions it was asked.
#[derive(Resource, Debug, Clone)]
pub struct ScriptedArbiter {
    pub decision: InterruptDecision,
    pub queries: Vec<String>,
}

impl ScriptedArbiter {
    pub fn new(decision: InterruptDecision) -> Self {
        Self {
            decision,
            queries: Vec::new(),
        }
    }
}

impl Default for ScriptedArbiter {
    fn default() -> Self {
        Self::new(InterruptDecision::Ignore)
    }
}

impl ActivityArbiter for ScriptedArbiter {
    fn cancel_or_ignore(&mut self, query: &str) -> InterruptDecision {
        self.queries.push(query.to_string());
        self.decision
    }
}

/// Resource: region signals sent to the coarse world layer.
#[derive(Resource, Debug, Default, Serialize)]
pub struct RegionSignals {
    pub sent: Vec<(Tripoint, i32)>,
}

impl WorldSignals for RegionSignals {
    fn signal_region(&mut self, coarse_point: Tripoint, strength: i32) {
        self.sent.push((coarse_point, strength));
    }
}
