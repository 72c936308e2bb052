//! Listener Perception Resolver
//!
//! Resolves every listener-cadence sound against one listener: hearing
//! damage, sleep, activity interruption, messages, audio cues, and the
//! "heard but not seen" markers.
//!
//! Each (listener, sound) pair ends in exactly one [`Outcome`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sound_events::{Direction, Marker, Severity, SoundEvent, Tripoint};
use tracing::{debug, warn};

use crate::collaborators::{
    ActivityArbiter, AudioBackend, InterruptDecision, MessageSurface, TerrainService,
};
use crate::config::{AudioConfig, DeafnessConfig, SleepConfig, SoundConfig};
use crate::dispatch::error_radius;
use crate::listener::{ListenerState, SleepState, SleeperKind};
use crate::markers::MarkerCache;

/// Collaborators a perception pass talks to.
pub struct PerceptionContext<'a> {
    pub terrain: &'a dyn TerrainService,
    pub audio: &'a mut dyn AudioBackend,
    pub messages: &'a mut dyn MessageSurface,
    pub arbiter: &'a mut dyn ActivityArbiter,
}

/// Terminal state of one sound for one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Farther away than the sound reaches
    Inaudible,
    /// Already deaf, and the sound extended the deafness
    Prolonged,
    /// Already deaf, nothing else happened
    DeafUnaffected,
    NewlyDeafened,
    /// Lost under weather noise
    Drowned,
    /// The listener slept through it
    SleptThrough,
    /// Heard in full
    Resolved,
}

/// Distance used for listener hearing: planar Chebyshev plus a fixed cost per
/// elevation layer.
pub fn listener_distance(listener: Tripoint, source: Tripoint, vertical_factor: i32) -> i32 {
    listener.planar_distance(source) + (listener.z - source.z).abs() * vertical_factor
}

/// Playback volume (0..=100 scaled by the master volume) for a sound `distance` tiles away.
pub fn heard_audio_volume(distance: i32, config: &AudioConfig) -> i32 {
    let level = (100.0 - 1.0 - config.falloff_per_tile * distance as f32).max(0.0);
    (level * config.volume_multiplier) as i32
}

/// Playback angle for a source; the listener's own tile plays centered.
pub fn heard_audio_angle(listener: Tripoint, source: Tripoint) -> i32 {
    if listener.x == source.x && listener.y == source.y {
        return 0;
    }
    (listener.bearing_to(source) + 90).rem_euclid(360)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text posted for a sound heard from `source`.
pub fn hearing_message(listener: Tripoint, source: Tripoint, description: &str) -> String {
    match Direction::between(listener, source) {
        Direction::Center => capitalize(description),
        dir @ (Direction::Above | Direction::Below) => {
            format!("From {} you hear {}", dir, description)
        }
        dir => format!("From the {} you hear {}", dir, description),
    }
}

/// Rolls whether a sound felt at `felt` volume damages the listener's ears.
fn is_deafening<R: Rng + ?Sized>(felt: i32, config: &DeafnessConfig, rng: &mut R) -> bool {
    if felt <= 0 || felt < config.loudness_threshold {
        return false;
    }
    rng.gen_range(felt / 2..=felt) >= config.loudness_threshold
}

fn roll_dice<R: Rng + ?Sized>(count: u32, sides: u32, rng: &mut R) -> i32 {
    let sides = sides.max(1);
    (0..count).map(|_| rng.gen_range(1..=sides) as i32).sum()
}

/// Rolls whether a sound heard at `heard` wakes the listener.
fn wakes<R: Rng + ?Sized>(
    listener: &ListenerState,
    heard: i32,
    config: &SleepConfig,
    rng: &mut R,
) -> bool {
    if listener.sleep == SleepState::Sedated {
        return false;
    }
    let dice = match listener.sleeper {
        SleeperKind::Normal => config.normal_dice,
        SleeperKind::Heavy => config.heavy_dice,
        SleeperKind::VeryHeavy => config.very_heavy_dice,
    };
    roll_dice(dice, config.dice_sides, rng) < heard
}

/// Picks where the marker for a sound at `source` goes, or `None` if the
/// listener can see the source.
fn marker_position<R: Rng + ?Sized>(
    listener: Tripoint,
    source: Tripoint,
    heard: i32,
    terrain: &dyn TerrainService,
    rng: &mut R,
) -> Option<Tripoint> {
    if source == listener || terrain.can_see(listener, source) {
        return None;
    }
    let other_layer = source.z != listener.z;
    let candidates: Vec<Tripoint> = source
        .points_in_radius(error_radius(heard))
        .filter(|p| other_layer || !terrain.can_see(listener, *p))
        .collect();
    Some(candidates.choose(rng).copied().unwrap_or(source))
}

/// Resolves one sound for one listener.
pub fn resolve_event<R: Rng + ?Sized>(
    event: &SoundEvent,
    listener: &mut ListenerState,
    ctx: &mut PerceptionContext<'_>,
    config: &SoundConfig,
    markers: &mut MarkerCache,
    rng: &mut R,
) -> Outcome {
    let effective = event.volume as f32 * listener.hearing_multiplier;
    let distance = listener_distance(
        listener.position,
        event.position,
        config.listener.vertical_distance_factor,
    );
    if distance as f32 > effective {
        return Outcome::Inaudible;
    }

    let deafness = &config.deafness;
    let felt = (effective as i32).max(event.volume).saturating_sub(distance);
    let deafening = !listener.deaf_immune && is_deafening(felt, deafness, rng);

    if listener.is_deaf() {
        if !deafening {
            return Outcome::DeafUnaffected;
        }
        let over = felt.saturating_sub(deafness.duration_offset);
        let turns = ((over / deafness.prolong_divisor.max(1)).max(0) as u32)
            .min(deafness.prolong_cap_turns);
        listener.add_deafness(turns, deafness.max_deafness_turns);
        if listener.feels_pain {
            ctx.messages
                .post_message(Severity::Bad, "Your eardrums suddenly ache!");
            if listener.pain < 10 {
                listener.pain += rng.gen_range(0..=2);
            }
        }
        debug!(felt, turns, "deafness prolonged by sound at {}", event.position);
        return Outcome::Prolonged;
    }

    if deafening {
        let turns = (felt.saturating_sub(deafness.duration_offset) / deafness.onset_divisor.max(1))
            .max(0) as u32;
        listener.add_deafness(turns, deafness.max_deafness_turns);
        if listener.is_deaf() {
            ctx.audio.play_hearing_loss_cue(listener.deafness_remaining);
            debug!(felt, turns, "listener deafened by sound at {}", event.position);
            return Outcome::NewlyDeafened;
        }
    }

    let attenuated = event.volume.saturating_sub(ctx.terrain.weather_attenuation());
    let heard = ((attenuated as f32 * listener.hearing_multiplier) as i32).saturating_sub(distance);
    if heard < 0 {
        return Outcome::Drowned;
    }

    if distance <= config.listener.meter_radius {
        listener.volume_meter = listener.volume_meter.max(heard);
    }

    if listener.is_asleep() {
        if !wakes(listener, heard, &config.sleep, rng) {
            return Outcome::SleptThrough;
        }
        listener.wake_up();
        ctx.messages
            .post_message(Severity::Warning, "Something is making noise.");
    }

    let here = listener.position;
    if !event.is_ambient
        && event.position != here
        && !ctx.terrain.can_see(here, event.position)
        && listener.activity_interruptible()
    {
        let query = if event.description.is_empty() {
            "Heard a noise!".to_string()
        } else {
            format!("Heard {}!", event.description)
        };
        match ctx.arbiter.cancel_or_ignore(&query) {
            InterruptDecision::Cancel => listener.activity = None,
            InterruptDecision::Ignore => {
                if let Some(activity) = listener.activity.as_mut() {
                    activity.ignore_trivial = true;
                }
            }
        }
    }

    if !event.description.is_empty() {
        let text = hearing_message(here, event.position, &event.description);
        let severity = if event.position == here {
            Severity::Neutral
        } else {
            Severity::Warning
        };
        ctx.messages.post_message(severity, &text);
    }

    if let Some(cue) = &event.audio_cue {
        let audio_distance = here.grid_distance(event.position);
        let volume = heard_audio_volume(audio_distance, &config.audio);
        let angle = heard_audio_angle(here, event.position);
        if let Err(e) = ctx.audio.play_cue(&cue.id, &cue.variant, volume, angle) {
            warn!("Skipping cue {}: {}", cue, e);
        }
    }

    if let Some(position) = marker_position(here, event.position, heard, ctx.terrain, rng) {
        markers.place(Marker::new(position, event.description.clone()));
    }

    Outcome::Resolved
}

/// Resolves a whole listener-cadence buffer, in emission order. The volume
/// meter starts from zero each pass.
pub fn resolve_listener<R: Rng + ?Sized>(
    events: &[SoundEvent],
    listener: &mut ListenerState,
    ctx: &mut PerceptionContext<'_>,
    config: &SoundConfig,
    markers: &mut MarkerCache,
    rng: &mut R,
) -> Vec<Outcome> {
    listener.volume_meter = 0;
    events
        .iter()
        .map(|event| resolve_event(event, listener, ctx, config, markers, rng))
        .collect()
}
