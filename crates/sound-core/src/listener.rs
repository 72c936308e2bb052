//! Listener State
//!
//! The hearing-related state of the listening character. Owned by the
//! character; the perception pass reads it and mutates it in place.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use sound_events::Tripoint;

/// Whether the listener is awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepState {
    #[default]
    Awake,
    Asleep,
    /// Asleep under narcosis; noise cannot wake them
    Sedated,
}

/// How hard the listener is to wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleeperKind {
    #[default]
    Normal,
    Heavy,
    VeryHeavy,
}

/// Something the listener is busy doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Trivial noises no longer interrupt this activity
    pub ignore_trivial: bool,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ignore_trivial: false,
        }
    }
}

/// Component: a character that perceives sounds individually.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerState {
    pub position: Tripoint,
    /// 1.0 = unimpaired
    pub hearing_multiplier: f32,
    /// Turns of deafness left
    pub deafness_remaining: u32,
    /// Never gains deafness
    pub deaf_immune: bool,
    pub sleep: SleepState,
    pub sleeper: SleeperKind,
    pub activity: Option<Activity>,
    pub feels_pain: bool,
    pub pain: u32,
    /// Loudest sound heard on or next to the listener's tile this pass
    pub volume_meter: i32,
}

impl ListenerState {
    pub fn new(position: Tripoint) -> Self {
        Self {
            position,
            hearing_multiplier: 1.0,
            deafness_remaining: 0,
            deaf_immune: false,
            sleep: SleepState::Awake,
            sleeper: SleeperKind::Normal,
            activity: None,
            feels_pain: true,
            pain: 0,
            volume_meter: 0,
        }
    }

    pub fn with_hearing(mut self, multiplier: f32) -> Self {
        self.hearing_multiplier = multiplier.max(0.0);
        self
    }

    pub fn with_activity(mut self, name: impl Into<String>) -> Self {
        self.activity = Some(Activity::new(name));
        self
    }

    pub fn asleep(mut self, sleeper: SleeperKind) -> Self {
        self.sleep = SleepState::Asleep;
        self.sleeper = sleeper;
        self
    }

    pub fn is_deaf(&self) -> bool {
        self.deafness_remaining > 0
    }

    pub fn is_asleep(&self) -> bool {
        !matches!(self.sleep, SleepState::Awake)
    }

    /// True when a noise may still propose cancelling the current activity.
    pub fn activity_interruptible(&self) -> bool {
        self.activity.as_ref().is_some_and(|a| !a.ignore_trivial)
    }

    /// Adds deafness, clamped to `cap` turns. Returns the turns actually added.
    pub fn add_deafness(&mut self, turns: u32, cap: u32) -> u32 {
        if self.deaf_immune {
            return 0;
        }
        let before = self.deafness_remaining;
        self.deafness_remaining = before.saturating_add(turns).min(cap.max(before));
        self.deafness_remaining - before
    }

    /// Passes one turn of deafness.
    pub fn recover(&mut self) {
        self.deafness_remaining = self.deafness_remaining.saturating_sub(1);
    }

    pub fn wake_up(&mut self) {
        self.sleep = SleepState::Awake;
    }
}
