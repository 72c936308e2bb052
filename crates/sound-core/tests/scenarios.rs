//! End-to-end sound scenes
//!
//! Drives the engine through its public entry points with recording
//! collaborators.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use sound_core::backends::{AudioLog, MessageLog, OpenTerrain, RegionSignals, ScriptedArbiter};
use sound_core::clustering::{cluster_cap, cluster_with_assignments};
use sound_core::collaborators::{HearingCapability, InterruptDecision, ReactiveAgent, TriggerKind};
use sound_core::perception::PerceptionContext;
use sound_core::sink::Noise;
use sound_core::{ListenerState, Outcome, SoundConfig, SoundEngine};
use sound_events::{fixtures, SoundCategory, Tripoint};

struct Recorder {
    terrain: OpenTerrain,
    audio: AudioLog,
    messages: MessageLog,
    arbiter: ScriptedArbiter,
}

impl Recorder {
    fn new(sight_radius: i32) -> Self {
        Self {
            terrain: OpenTerrain::new(sight_radius),
            audio: AudioLog::new(),
            messages: MessageLog::new(),
            arbiter: ScriptedArbiter::new(InterruptDecision::Ignore),
        }
    }

    fn perceive(
        &mut self,
        engine: &mut SoundEngine,
        listener: &mut ListenerState,
        rng: &mut SmallRng,
    ) -> Vec<Outcome> {
        let mut ctx = PerceptionContext {
            terrain: &self.terrain,
            audio: &mut self.audio,
            messages: &mut self.messages,
            arbiter: &mut self.arbiter,
        };
        engine.process_listener_perception(listener, &mut ctx, rng)
    }
}

struct Walker {
    position: Tripoint,
    goals: Vec<(Tripoint, u32)>,
}

impl ReactiveAgent for Walker {
    fn position(&self) -> Tripoint {
        self.position
    }

    fn hearing(&self) -> HearingCapability {
        HearingCapability::Normal
    }

    fn wander_to(&mut self, target: Tripoint, duration: u32) {
        self.goals.push((target, duration));
    }

    fn receive_trigger(&mut self, _kind: TriggerKind, _intensity: i32) {}
}

#[test]
fn test_bang_on_listener_tile() {
    let mut engine = SoundEngine::default();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut recorder = Recorder::new(10);
    let here = Tripoint::new(10, 10, 0);
    let mut listener = ListenerState::new(here);

    engine
        .emit_sound(here, 15, SoundCategory::Combat, "a loud bang", false, None)
        .unwrap();
    let outcomes = recorder.perceive(&mut engine, &mut listener, &mut rng);

    assert_eq!(outcomes, vec![Outcome::Resolved]);
    assert_eq!(recorder.messages.texts(), vec!["A loud bang".to_string()]);
    assert!(engine.get_markers().is_empty());
    assert!(!listener.is_deaf());
}

#[test]
fn test_faint_distant_sound_is_ignored() {
    let mut engine = SoundEngine::default();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut recorder = Recorder::new(0);
    let mut listener = ListenerState::new(Tripoint::new(0, 0, 0));
    let before = listener.clone();

    engine
        .emit_sound(Tripoint::new(25, 0, 0), 10, SoundCategory::Speech, "a cough", false, None)
        .unwrap();
    let outcomes = recorder.perceive(&mut engine, &mut listener, &mut rng);

    assert_eq!(outcomes, vec![Outcome::Inaudible]);
    assert!(recorder.messages.entries.is_empty());
    assert!(engine.get_markers().is_empty());
    assert_eq!(listener, before);
}

#[test]
fn test_two_hundred_quiet_sounds_cluster_to_ten() {
    let mut rng = SmallRng::seed_from_u64(200);
    let noises: Vec<Noise> = (0..200)
        .map(|_| {
            Noise::new(
                Tripoint::new(rng.gen_range(0..50), rng.gen_range(0..50), 0),
                rng.gen_range(1..=5),
            )
        })
        .collect();

    assert_eq!(cluster_cap(200, 10), 10);
    let clustering = cluster_with_assignments(&noises, 10, &mut rng);
    assert!(clustering.centroids.len() <= 10);
    for (noise, &cluster) in noises.iter().zip(&clustering.assignments) {
        assert!(noise.volume <= clustering.centroids[cluster].volume);
    }

    // The same scene through the engine
    let mut engine = SoundEngine::default();
    for noise in &noises {
        engine
            .emit_sound(noise.position, noise.volume, SoundCategory::Movement, "", false, None)
            .unwrap();
    }
    let mut walkers = vec![Walker {
        position: Tripoint::new(25, 25, 0),
        goals: Vec::new(),
    }];
    let summary = engine.process_agent_reactions(
        &mut walkers,
        &OpenTerrain::new(0),
        &mut RegionSignals::default(),
        &mut rng,
    );
    assert!(summary.clusters <= 10);
    assert!(summary.clusters > 0);
    assert_eq!(summary.signals, 0);
}

#[test]
fn test_gunshot_and_whispers_keep_loudest_volume() {
    let mut engine = SoundEngine::default();
    let mut rng = SmallRng::seed_from_u64(9);
    for event in fixtures::whisper_beside_gunshot(Tripoint::new(5, 5, 0)) {
        engine.emit(event).unwrap();
    }

    let preview = engine.get_cluster_preview(&mut rng);
    assert_eq!(preview.centroids.len(), 1);
    assert_eq!(preview.centroids[0].volume, 100);
    assert_eq!(preview.sources.len(), 10);
}

#[test]
fn test_fixture_scene_through_both_passes() {
    let mut engine = SoundEngine::default();
    let mut rng = SmallRng::seed_from_u64(4);
    let mut recorder = Recorder::new(6);
    let mut listener = ListenerState::new(Tripoint::new(25, 25, 0)).with_activity("reading");

    for event in fixtures::sample_events() {
        if event.is_footstep {
            engine.emit_footstep(event.position, event.volume, None).unwrap();
        } else {
            engine.emit(event).unwrap();
        }
    }
    assert!(engine.pending_listener_sounds() > engine.pending_agent_sounds());

    let mut walkers = vec![Walker {
        position: Tripoint::new(20, 20, 0),
        goals: Vec::new(),
    }];
    engine.process_agent_reactions(
        &mut walkers,
        &recorder.terrain,
        &mut RegionSignals::default(),
        &mut rng,
    );
    let outcomes = recorder.perceive(&mut engine, &mut listener, &mut rng);

    assert_eq!(outcomes.len(), fixtures::sample_events().len());
    for marker in engine.get_markers() {
        if marker.position.z == listener.position.z {
            assert!(marker.position.planar_distance(listener.position) > 6);
        }
    }
    // Nothing queued after both passes
    assert_eq!(engine.pending_agent_sounds(), 0);
    assert_eq!(engine.pending_listener_sounds(), 0);
}

#[test]
fn test_repeated_blasts_stack_deafness() {
    let config = SoundConfig::default();
    let mut engine = SoundEngine::new(config.clone());
    let mut rng = SmallRng::seed_from_u64(11);
    let mut recorder = Recorder::new(10);
    let mut listener = ListenerState::new(Tripoint::new(0, 0, 0));

    for _ in 0..40 {
        engine.emit(fixtures::deafening_blast(Tripoint::new(0, 1, 0))).unwrap();
    }
    recorder.perceive(&mut engine, &mut listener, &mut rng);

    assert!(listener.deafness_remaining > 0);
    assert!(listener.deafness_remaining <= config.deafness.max_deafness_turns);
    assert_eq!(recorder.audio.hearing_loss.len(), 1);
    assert!(listener.pain <= 10 + 2);
}
