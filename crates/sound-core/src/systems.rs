//! ECS Integration
//!
//! Components, resources and systems that drive the sound engine from a
//! bevy_ecs schedule. Noise makers emit, agents react to the clustered
//! sounds and wander towards them, and the single listener perceives.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sound_events::{SoundCategory, Tripoint};
use bevy_ecs::query::QuerySingleError;
use tracing::debug;

use crate::ambience::{AmbientConditions, ChannelGroup, Soundscape};
use crate::backends::{AudioLog, MessageLog, OpenTerrain, RegionSignals, ScriptedArbiter};
use crate::collaborators::{AudioBackend, HearingCapability, ReactiveAgent, TriggerKind};
use crate::config::SoundConfig;
use crate::engine::SoundEngine;
use crate::listener::ListenerState;
use crate::perception::PerceptionContext;
use crate::SimRng;

/// How far the listener sees on open ground.
pub const DEFAULT_SIGHT_RADIUS: i32 = 8;

/// Component: tile an agent stands on.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition(pub Tripoint);

/// Component: how an agent hears.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hearing {
    pub capability: HearingCapability,
    /// Urgency scale, 0 = deaf
    pub factor: f32,
}

impl Default for Hearing {
    fn default() -> Self {
        Self {
            capability: HearingCapability::Normal,
            factor: 1.0,
        }
    }
}

/// Component: where an agent is heading because of a sound.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WanderGoal {
    pub target: Option<Tripoint>,
    pub turns_left: u32,
}

impl WanderGoal {
    pub fn is_active(&self) -> bool {
        self.target.is_some() && self.turns_left > 0
    }
}

/// Component: stimuli an agent has received.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundTriggers {
    pub received: u32,
    pub strongest: i32,
}

/// Component: an agent that makes noise now and then.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseMaker {
    pub volume: i32,
    pub category: SoundCategory,
    pub description: String,
    /// Chance per tick of making the noise
    pub chance: f32,
    /// Footstep volume while wandering
    pub footstep_volume: i32,
}

impl NoiseMaker {
    pub fn new(volume: i32, category: SoundCategory, description: impl Into<String>) -> Self {
        Self {
            volume,
            category,
            description: description.into(),
            chance: 0.1,
            footstep_volume: 4,
        }
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance.clamp(0.0, 1.0);
        self
    }
}

/// View of one agent's components as a [`ReactiveAgent`].
struct EcsAgent<'w> {
    position: Tripoint,
    hearing: Hearing,
    goal: Mut<'w, WanderGoal>,
    triggers: Mut<'w, SoundTriggers>,
}

impl ReactiveAgent for EcsAgent<'_> {
    fn position(&self) -> Tripoint {
        self.position
    }

    fn hearing(&self) -> HearingCapability {
        self.hearing.capability
    }

    fn hearing_factor(&self) -> f32 {
        self.hearing.factor
    }

    fn wander_to(&mut self, target: Tripoint, duration: u32) {
        // Follow the most compelling sound
        if duration >= self.goal.turns_left {
            self.goal.target = Some(target);
            self.goal.turns_left = duration;
        }
    }

    fn receive_trigger(&mut self, kind: TriggerKind, intensity: i32) {
        match kind {
            TriggerKind::Sound => {
                self.triggers.received += 1;
                self.triggers.strongest = self.triggers.strongest.max(intensity);
            }
        }
    }
}

/// Inserts every resource the sound systems read.
pub fn insert_sound_resources(world: &mut World, config: SoundConfig, seed: u64) {
    world.insert_resource(SoundEngine::new(config));
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(AmbientConditions::default());
    world.insert_resource(Soundscape::new());
    world.insert_resource(OpenTerrain::new(DEFAULT_SIGHT_RADIUS));
    world.insert_resource(RegionSignals::default());
    world.insert_resource(AudioLog::new());
    world.insert_resource(MessageLog::new());
    world.insert_resource(ScriptedArbiter::default());
}

/// Adds the sound systems in tick order.
pub fn add_sound_systems(schedule: &mut Schedule) {
    schedule.add_systems(
        (
            emit_agent_noise,
            update_soundscape,
            react_to_sounds,
            resolve_listener_perception,
            recover_hearing,
            advance_wanderers,
        )
            .chain(),
    );
}

/// Noise makers roll for their noise; wandering agents leave footsteps.
pub fn emit_agent_noise(
    mut engine: ResMut<SoundEngine>,
    mut rng: ResMut<SimRng>,
    query: Query<(Entity, &GridPosition, &NoiseMaker, Option<&WanderGoal>)>,
) {
    for (entity, position, maker, goal) in query.iter() {
        // Rejected sounds are logged by the engine
        if rng.0.gen::<f32>() < maker.chance {
            engine
                .emit_sound(
                    position.0,
                    maker.volume,
                    maker.category,
                    maker.description.clone(),
                    false,
                    None,
                )
                .ok();
        }
        if goal.is_some_and(WanderGoal::is_active) {
            engine
                .emit_footstep(position.0, maker.footstep_volume, Some(entity))
                .ok();
        }
    }
}

/// Keeps the listener's ambient loops current and the terrain's weather in step.
pub fn update_soundscape(
    engine: Res<SoundEngine>,
    conditions: Res<AmbientConditions>,
    mut terrain: ResMut<OpenTerrain>,
    mut soundscape: ResMut<Soundscape>,
    mut audio: ResMut<AudioLog>,
    listeners: Query<&ListenerState>,
) {
    if terrain.weather != conditions.weather {
        terrain.weather = conditions.weather;
    }
    let Ok(listener) = listeners.get_single() else {
        return;
    };
    soundscape.update(listener, &conditions, &mut *audio, &engine.config.audio);
}

/// Clusters this tick's sounds and dispatches them to every agent.
pub fn react_to_sounds(
    mut engine: ResMut<SoundEngine>,
    mut rng: ResMut<SimRng>,
    terrain: Res<OpenTerrain>,
    mut signals: ResMut<RegionSignals>,
    mut query: Query<(&GridPosition, &Hearing, &mut WanderGoal, &mut SoundTriggers)>,
) {
    let mut agents: Vec<EcsAgent> = query
        .iter_mut()
        .map(|(position, hearing, goal, triggers)| EcsAgent {
            position: position.0,
            hearing: *hearing,
            goal,
            triggers,
        })
        .collect();

    let summary =
        engine.process_agent_reactions(&mut agents, &*terrain, &mut *signals, &mut rng.0);
    if summary.reactions > 0 {
        debug!(
            clusters = summary.clusters,
            reactions = summary.reactions,
            signals = summary.signals,
            "agents reacted to sounds"
        );
    }
}

/// Resolves this tick's sounds for the listener.
pub fn resolve_listener_perception(
    mut engine: ResMut<SoundEngine>,
    mut rng: ResMut<SimRng>,
    terrain: Res<OpenTerrain>,
    mut audio: ResMut<AudioLog>,
    mut messages: ResMut<MessageLog>,
    mut arbiter: ResMut<ScriptedArbiter>,
    mut listeners: Query<&mut ListenerState>,
) {
    let mut listener = match listeners.get_single_mut() {
        Ok(listener) => listener,
        Err(e) => {
            let dropped = engine.discard_listener_buffer();
            if matches!(e, QuerySingleError::MultipleEntities(_)) {
                debug!(dropped, "more than one listener; sounds discarded");
            }
            return;
        }
    };
    let mut ctx = PerceptionContext {
        terrain: &*terrain,
        audio: &mut *audio,
        messages: &mut *messages,
        arbiter: &mut *arbiter,
    };
    engine.process_listener_perception(&mut listener, &mut ctx, &mut rng.0);
}

/// One turn of deafness wears off; the ringing stops with the last turn.
pub fn recover_hearing(mut audio: ResMut<AudioLog>, mut listeners: Query<&mut ListenerState>) {
    for mut listener in listeners.iter_mut() {
        if !listener.is_deaf() {
            continue;
        }
        listener.recover();
        if !listener.is_deaf() {
            audio.fade_group(ChannelGroup::Context, 0);
        }
    }
}

/// Moves wandering agents one tile towards their goal.
pub fn advance_wanderers(mut query: Query<(&mut GridPosition, &mut WanderGoal)>) {
    for (mut position, mut goal) in query.iter_mut() {
        let Some(target) = goal.target else {
            continue;
        };
        if goal.turns_left == 0 || position.0 == target {
            *goal = WanderGoal::default();
            continue;
        }
        let here = position.0;
        position.0 = Tripoint::new(
            here.x + (target.x - here.x).signum(),
            here.y + (target.y - here.y).signum(),
            here.z,
        );
        goal.turns_left -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambience::AmbientChannel;

    fn world_with_resources() -> World {
        let mut world = World::new();
        insert_sound_resources(&mut world, SoundConfig::default(), 7);
        world
    }

    fn spawn_agent(world: &mut World, x: i32, y: i32) -> Entity {
        world
            .spawn((
                GridPosition(Tripoint::new(x, y, 0)),
                Hearing::default(),
                WanderGoal::default(),
                SoundTriggers::default(),
            ))
            .id()
    }

    #[test]
    fn test_agents_react_and_wander() {
        let mut world = world_with_resources();
        let agent = spawn_agent(&mut world, 10, 0);
        world
            .resource_mut::<SoundEngine>()
            .emit_sound(Tripoint::new(0, 0, 0), 50, SoundCategory::Alarm, "", false, None)
            .unwrap();

        let mut schedule = Schedule::default();
        schedule.add_systems((react_to_sounds, advance_wanderers).chain());
        schedule.run(&mut world);

        let goal = world.get::<WanderGoal>(agent).unwrap();
        assert_eq!(goal.target, Some(Tripoint::new(0, 0, 0)));
        assert_eq!(goal.turns_left, 39);
        let triggers = world.get::<SoundTriggers>(agent).unwrap();
        assert_eq!(triggers.received, 1);
        assert_eq!(triggers.strongest, 40);
        assert_eq!(world.get::<GridPosition>(agent).unwrap().0, Tripoint::new(9, 0, 0));
    }

    #[test]
    fn test_deaf_agent_ignores_sound() {
        let mut world = world_with_resources();
        let agent = world
            .spawn((
                GridPosition(Tripoint::new(1, 0, 0)),
                Hearing {
                    capability: HearingCapability::None,
                    factor: 1.0,
                },
                WanderGoal::default(),
                SoundTriggers::default(),
            ))
            .id();
        world
            .resource_mut::<SoundEngine>()
            .emit_sound(Tripoint::new(0, 0, 0), 50, SoundCategory::Alarm, "", false, None)
            .unwrap();

        let mut schedule = Schedule::default();
        schedule.add_systems(react_to_sounds);
        schedule.run(&mut world);

        assert!(!world.get::<WanderGoal>(agent).unwrap().is_active());
        assert_eq!(world.get::<SoundTriggers>(agent).unwrap().received, 0);
    }

    #[test]
    fn test_wanderer_stops_at_target() {
        let mut world = World::new();
        let agent = world
            .spawn((
                GridPosition(Tripoint::new(0, 0, 0)),
                WanderGoal {
                    target: Some(Tripoint::new(2, -1, 0)),
                    turns_left: 10,
                },
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_wanderers);
        for _ in 0..3 {
            schedule.run(&mut world);
        }

        assert_eq!(world.get::<GridPosition>(agent).unwrap().0, Tripoint::new(2, -1, 0));
        assert!(!world.get::<WanderGoal>(agent).unwrap().is_active());
    }

    #[test]
    fn test_listener_hears_noise_makers() {
        let mut world = world_with_resources();
        world.spawn(ListenerState::new(Tripoint::new(0, 0, 0)));
        world.spawn((
            GridPosition(Tripoint::new(20, 0, 0)),
            NoiseMaker::new(50, SoundCategory::Speech, "someone shouting").with_chance(1.0),
        ));

        let mut schedule = Schedule::default();
        add_sound_systems(&mut schedule);
        schedule.run(&mut world);

        let messages = world.resource::<MessageLog>();
        assert_eq!(messages.texts(), vec!["From the east you hear someone shouting".to_string()]);
        let engine = world.resource::<SoundEngine>();
        assert_eq!(
            engine.description_at(Tripoint::new(20, 0, 0)),
            Some("someone shouting".to_string())
        );
        assert_eq!(engine.tick(), 1);
        assert!(world
            .resource::<AudioLog>()
            .is_channel_playing(AmbientChannel::DaytimeOutdoors));
    }

    #[test]
    fn test_sounds_discarded_without_single_listener() {
        let mut world = world_with_resources();
        world.spawn((
            GridPosition(Tripoint::new(5, 0, 0)),
            NoiseMaker::new(10, SoundCategory::Speech, "someone talking").with_chance(1.0),
        ));

        let mut schedule = Schedule::default();
        add_sound_systems(&mut schedule);
        for _ in 0..50 {
            schedule.run(&mut world);
        }
        let engine = world.resource::<SoundEngine>();
        assert_eq!(engine.pending_agent_sounds(), 0);
        assert_eq!(engine.pending_listener_sounds(), 0);

        // Two listeners count as no listener
        world.spawn(ListenerState::new(Tripoint::new(0, 0, 0)));
        world.spawn(ListenerState::new(Tripoint::new(9, 0, 0)));
        schedule.run(&mut world);
        assert_eq!(world.resource::<SoundEngine>().pending_listener_sounds(), 0);
        assert!(world.resource::<MessageLog>().entries.is_empty());
    }

    #[test]
    fn test_late_listener_hears_only_this_tick() {
        let mut world = world_with_resources();
        world.spawn((
            GridPosition(Tripoint::new(5, 0, 0)),
            NoiseMaker::new(10, SoundCategory::Speech, "someone talking").with_chance(1.0),
        ));

        let mut schedule = Schedule::default();
        add_sound_systems(&mut schedule);
        for _ in 0..10 {
            schedule.run(&mut world);
        }
        world.spawn(ListenerState::new(Tripoint::new(0, 0, 0)));
        schedule.run(&mut world);

        assert_eq!(world.resource::<MessageLog>().entries.len(), 1);
    }

    #[test]
    fn test_deafness_wears_off() {
        let mut world = world_with_resources();
        let mut listener = ListenerState::new(Tripoint::new(0, 0, 0));
        listener.deafness_remaining = 2;
        let id = world.spawn(listener).id();
        world
            .resource_mut::<AudioLog>()
            .play_hearing_loss_cue(2);

        let mut schedule = Schedule::default();
        schedule.add_systems(recover_hearing);
        schedule.run(&mut world);
        assert!(world.get::<ListenerState>(id).unwrap().is_deaf());
        schedule.run(&mut world);

        assert!(!world.get::<ListenerState>(id).unwrap().is_deaf());
        assert!(!world
            .resource::<AudioLog>()
            .is_channel_playing(AmbientChannel::DeafnessTone));
    }
}
