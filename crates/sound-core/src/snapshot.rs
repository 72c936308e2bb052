//! Sound Snapshots
//!
//! A JSON view of the sound state at the end of a run: markers, the pending
//! cluster preview, the listener, and what was sent to the world layer.

use bevy_ecs::prelude::*;
use serde::Serialize;
use sound_events::{Marker, Severity, Tripoint};
use std::fs;
use std::path::Path;

use crate::backends::{AudioLog, MessageLog, RegionSignals};
use crate::engine::{ClusterPreview, SoundEngine};
use crate::listener::ListenerState;
use crate::SimRng;

#[derive(Debug, Serialize)]
pub struct SoundSnapshot {
    pub tick: u64,
    pub markers: Vec<Marker>,
    pub cluster_preview: ClusterPreview,
    pub listener: Option<ListenerState>,
    pub signals: Vec<(Tripoint, i32)>,
    pub messages: Vec<(Severity, String)>,
    pub cues_played: usize,
}

/// Collects a snapshot from the world.
pub fn generate_snapshot(world: &mut World) -> SoundSnapshot {
    let listener = world
        .query::<&ListenerState>()
        .iter(world)
        .next()
        .cloned();

    let cluster_preview = world.resource_scope(|world, mut rng: Mut<SimRng>| {
        world.resource::<SoundEngine>().get_cluster_preview(&mut rng.0)
    });

    let engine = world.resource::<SoundEngine>();
    SoundSnapshot {
        tick: engine.tick(),
        markers: engine.get_markers(),
        cluster_preview,
        listener,
        signals: world.resource::<RegionSignals>().sent.clone(),
        messages: world.resource::<MessageLog>().entries.clone(),
        cues_played: world.resource::<AudioLog>().cues.len(),
    }
}

/// Writes a snapshot as pretty JSON.
pub fn write_snapshot(snapshot: &SoundSnapshot, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoundConfig;
    use crate::systems::insert_sound_resources;
    use sound_events::SoundCategory;

    #[test]
    fn test_snapshot_round_trips_to_json() {
        let mut world = World::new();
        insert_sound_resources(&mut world, SoundConfig::default(), 1);
        world.spawn(ListenerState::new(Tripoint::new(3, 3, 0)));
        world
            .resource_mut::<SoundEngine>()
            .emit_sound(Tripoint::new(9, 9, 0), 12, SoundCategory::Activity, "hammering", false, None)
            .unwrap();

        let snapshot = generate_snapshot(&mut world);
        assert_eq!(snapshot.cluster_preview.sources, vec![Tripoint::new(9, 9, 0)]);
        assert!(snapshot.listener.is_some());

        let file = tempfile::NamedTempFile::new().unwrap();
        write_snapshot(&snapshot, file.path()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tick"], 0);
        assert_eq!(value["cluster_preview"]["centroids"][0]["volume"], 12);
    }
}
