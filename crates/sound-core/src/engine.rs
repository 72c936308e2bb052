//! Sound Engine
//!
//! Owns the two sound buffers, the marker cache, and the tuning, and exposes
//! the producer entry points, the per-tick passes, and the queries.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::Serialize;
use sound_events::{AudioCue, Marker, SoundCategory, SoundEvent, Tripoint};
use tracing::debug;

use crate::clustering::{cluster_sounds, Centroid};
use crate::collaborators::{ReactiveAgent, TerrainService, WorldSignals};
use crate::config::SoundConfig;
use crate::dispatch::{dispatch_reactions, DispatchSummary};
use crate::error::SoundError;
use crate::listener::ListenerState;
use crate::markers::MarkerCache;
use crate::perception::{resolve_listener, Outcome, PerceptionContext};
use crate::sink::SoundSink;

/// Pending agent-cadence sounds grouped the way the next dispatch would group them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterPreview {
    pub sources: Vec<Tripoint>,
    pub centroids: Vec<Centroid>,
}

/// Resource: the sound subsystem.
#[derive(Resource, Debug, Default)]
pub struct SoundEngine {
    pub config: SoundConfig,
    sink: SoundSink,
    markers: MarkerCache,
    /// Agent passes run so far
    tick: u64,
}

impl SoundEngine {
    pub fn new(config: SoundConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Emits a sound heard by agents and by the listener.
    pub fn emit_sound(
        &mut self,
        position: Tripoint,
        volume: i32,
        category: SoundCategory,
        description: impl Into<String>,
        ambient: bool,
        audio_cue: Option<AudioCue>,
    ) -> Result<(), SoundError> {
        let mut event = SoundEvent::new(position, volume, category)
            .with_description(description)
            .with_ambient(ambient);
        event.audio_cue = audio_cue;
        self.emit(event)
    }

    /// Emits a prepared event to both buffers.
    pub fn emit(&mut self, event: SoundEvent) -> Result<(), SoundError> {
        let position = event.position;
        self.sink.emit(event).map_err(|e| {
            debug!("Dropped sound at {}: {}", position, e);
            e
        })
    }

    /// Emits background noise that never interrupts the listener.
    pub fn emit_ambient(
        &mut self,
        position: Tripoint,
        volume: i32,
        description: impl Into<String>,
    ) -> Result<(), SoundError> {
        self.emit_sound(position, volume, SoundCategory::Ambient, description, true, None)
    }

    /// Emits a footstep. Footsteps only reach the listener.
    pub fn emit_footstep(
        &mut self,
        position: Tripoint,
        volume: i32,
        source_agent: Option<Entity>,
    ) -> Result<(), SoundError> {
        self.sink
            .emit_listener_only(SoundEvent::footstep(position, volume))
            .map_err(|e| {
                debug!(?source_agent, "Dropped footstep at {}: {}", position, e);
                e
            })
    }

    /// Drains the agent buffer, clusters it, and dispatches the clusters.
    pub fn process_agent_reactions<A: ReactiveAgent, R: Rng + ?Sized>(
        &mut self,
        agents: &mut [A],
        terrain: &dyn TerrainService,
        signals: &mut dyn WorldSignals,
        rng: &mut R,
    ) -> DispatchSummary {
        let noises = self.sink.drain_agent_buffer();
        let tick = self.tick;
        self.tick += 1;

        let centroids = cluster_sounds(&noises, self.config.clustering.min_clusters, rng);
        let summary = dispatch_reactions(
            &centroids,
            agents,
            terrain.weather_attenuation(),
            tick,
            &self.config.reaction,
            signals,
            rng,
        );
        if !noises.is_empty() {
            debug!(
                sounds = noises.len(),
                clusters = summary.clusters,
                reactions = summary.reactions,
                "agent pass {}",
                tick
            );
        }
        summary
    }

    /// Drains the listener buffer into one listener and rebuilds the markers.
    pub fn process_listener_perception<R: Rng + ?Sized>(
        &mut self,
        listener: &mut ListenerState,
        ctx: &mut PerceptionContext<'_>,
        rng: &mut R,
    ) -> Vec<Outcome> {
        let events = self.sink.drain_listener_buffer();
        let mut markers = MarkerCache::new();
        let outcomes = resolve_listener(&events, listener, ctx, &self.config, &mut markers, rng);
        self.markers.replace(markers);
        outcomes
    }

    /// Drops the listener buffer when there is nobody to hear it. Returns how
    /// many sounds were dropped.
    pub fn discard_listener_buffer(&mut self) -> usize {
        self.sink.drain_listener_buffer().len()
    }

    /// Clears both buffers and the markers.
    pub fn reset_all(&mut self) {
        self.sink.clear();
        self.markers.clear();
    }

    pub fn get_markers(&self) -> Vec<Marker> {
        self.markers.markers()
    }

    /// Clusters the pending agent buffer without draining it.
    pub fn get_cluster_preview<R: Rng + ?Sized>(&self, rng: &mut R) -> ClusterPreview {
        let pending = self.sink.agent_buffer();
        ClusterPreview {
            sources: pending.iter().map(|n| n.position).collect(),
            centroids: cluster_sounds(pending, self.config.clustering.min_clusters, rng),
        }
    }

    pub fn description_at(&self, position: Tripoint) -> Option<String> {
        self.markers.description_at(position)
    }

    pub fn pending_agent_sounds(&self) -> usize {
        self.sink.agent_buffer().len()
    }

    pub fn pending_listener_sounds(&self) -> usize {
        self.sink.listener_buffer().len()
    }
}
