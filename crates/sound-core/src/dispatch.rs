//! Agent Reaction Dispatcher
//!
//! Applies clustered sounds to every agent that can hear, and forwards loud
//! clusters to the coarse world layer so off-screen groups can respond.

use rand::Rng;
use serde::Serialize;
use sound_events::Tripoint;
use tracing::debug;

use crate::clustering::Centroid;
use crate::collaborators::{HearingCapability, ReactiveAgent, TriggerKind, WorldSignals};
use crate::config::ReactionConfig;

/// Localization error for a sound heard at `volume`: louder sounds are placed
/// more precisely.
pub fn error_radius(volume: i32) -> i32 {
    match volume {
        v if v >= 20 => 0,
        v if v >= 10 => 1,
        v if v >= 5 => 3,
        _ => 5,
    }
}

/// What an agent does about one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    /// Where the agent thinks the sound came from
    pub target: Tripoint,
    pub urgency: f32,
    pub wander_turns: u32,
    /// Volume left after distance
    pub volume: i32,
}

/// Number of clusters, reactions, and region signals in one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub clusters: usize,
    pub reactions: usize,
    pub signals: usize,
}

fn straight_distance(a: Tripoint, b: Tripoint) -> f32 {
    a.euclidean_distance_to(b.x as f32, b.y as f32, b.z as f32)
}

/// Picks a point within `radius` of `source` that is no farther from `hearer`
/// than the source itself.
pub fn jitter_target<R: Rng + ?Sized>(
    source: Tripoint,
    hearer: Tripoint,
    radius: i32,
    rng: &mut R,
) -> Tripoint {
    if radius <= 0 {
        return source;
    }
    let offset = Tripoint::new(
        rng.gen_range(-radius..=radius),
        rng.gen_range(-radius..=radius),
        0,
    );
    let limit = straight_distance(hearer, source);

    let candidate = source + offset;
    if straight_distance(hearer, candidate) <= limit {
        return candidate;
    }
    let mirrored = source - offset;
    if straight_distance(hearer, mirrored) <= limit {
        return mirrored;
    }
    source
}

/// Computes one agent's reaction to one cluster, or `None` if it cannot hear it.
pub fn react<R: Rng + ?Sized>(
    centroid: &Centroid,
    weather_attenuation: i32,
    position: Tripoint,
    hearing: HearingCapability,
    hearing_factor: f32,
    config: &ReactionConfig,
    rng: &mut R,
) -> Option<Reaction> {
    if hearing == HearingCapability::None || hearing_factor <= 0.0 {
        return None;
    }

    let volume = centroid.volume.saturating_sub(weather_attenuation);
    let distance = position
        .euclidean_distance_to(centroid.x, centroid.y, centroid.z)
        .round() as i32;
    let enhanced = hearing == HearingCapability::Enhanced;
    let effective = if enhanced {
        volume.saturating_mul(2).saturating_sub(distance)
    } else {
        volume.saturating_sub(distance)
    };
    if effective <= 0 {
        return None;
    }

    let target = jitter_target(centroid.position(), position, error_radius(effective), rng);
    let wander_multiplier = if enhanced {
        config.enhanced_wander_multiplier.max(1)
    } else {
        1
    };

    Some(Reaction {
        target,
        urgency: effective as f32 * hearing_factor,
        wander_turns: effective.saturating_mul(wander_multiplier) as u32,
        volume: effective,
    })
}

/// Signal strength and coarse region for a loud cluster.
pub fn region_signal(
    centroid: &Centroid,
    weather_attenuation: i32,
    config: &ReactionConfig,
) -> Option<(Tripoint, i32)> {
    let position = centroid.position();
    let mut volume = centroid.volume.saturating_sub(weather_attenuation);
    // Deeper layers muffle more.
    if position.z < 0 {
        volume /= config
            .underground_divisor
            .saturating_mul(position.z.saturating_abs())
            .max(1);
    }
    if volume <= config.alert_threshold {
        return None;
    }

    let region_size = config.region_size.max(1);
    let strength = (volume / region_size + i32::from(volume % region_size != 0))
        .max(config.min_signal)
        .min(config.max_signal);
    let coarse = Tripoint::new(
        position.x.div_euclid(region_size),
        position.y.div_euclid(region_size),
        position.z,
    );
    Some((coarse, strength))
}

/// Dispatches every cluster to every agent. Region signals go out only on
/// ticks that fall on the signal cadence.
pub fn dispatch_reactions<A: ReactiveAgent, R: Rng + ?Sized>(
    centroids: &[Centroid],
    agents: &mut [A],
    weather_attenuation: i32,
    tick: u64,
    config: &ReactionConfig,
    signals: &mut dyn WorldSignals,
    rng: &mut R,
) -> DispatchSummary {
    let mut summary = DispatchSummary {
        clusters: centroids.len(),
        ..Default::default()
    };
    let on_cadence = tick % config.signal_cadence_ticks.max(1) == 0;

    for centroid in centroids {
        if on_cadence {
            if let Some((coarse, strength)) = region_signal(centroid, weather_attenuation, config)
            {
                debug!(volume = centroid.volume, strength, "signalling region {}", coarse);
                signals.signal_region(coarse, strength);
                summary.signals += 1;
            }
        }

        for agent in agents.iter_mut() {
            let Some(reaction) = react(
                centroid,
                weather_attenuation,
                agent.position(),
                agent.hearing(),
                agent.hearing_factor(),
                config,
                rng,
            ) else {
                continue;
            };

            agent.receive_trigger(TriggerKind::Sound, reaction.urgency.round() as i32);
            agent.wander_to(reaction.target, reaction.wander_turns);
            summary.reactions += 1;
        }
    }

    summary
}
