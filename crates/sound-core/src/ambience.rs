//! Ambient Soundscape
//!
//! Keeps the listener's environment loops (time of day, shelter, weather)
//! playing on their fixed channels, once per listener tick.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collaborators::AudioBackend;
use crate::config::AudioConfig;
use crate::listener::ListenerState;

/// Asset id shared by every environment loop.
pub const ENVIRONMENT_CUE: &str = "environment";

/// Dedicated playback channels for looping tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientChannel {
    DaytimeOutdoors,
    NighttimeOutdoors,
    Underground,
    Indoors,
    IndoorsRain,
    OutdoorsSnow,
    OutdoorsFlurry,
    OutdoorsThunder,
    OutdoorsRain,
    OutdoorsDrizzle,
    DeafnessTone,
}

impl AmbientChannel {
    /// Group the channel fades with.
    pub fn group(self) -> ChannelGroup {
        match self {
            AmbientChannel::DaytimeOutdoors | AmbientChannel::NighttimeOutdoors => {
                ChannelGroup::TimeOfDay
            }
            AmbientChannel::DeafnessTone => ChannelGroup::Context,
            _ => ChannelGroup::Weather,
        }
    }

    const OUTDOOR_WEATHER: [AmbientChannel; 5] = [
        AmbientChannel::OutdoorsSnow,
        AmbientChannel::OutdoorsFlurry,
        AmbientChannel::OutdoorsThunder,
        AmbientChannel::OutdoorsRain,
        AmbientChannel::OutdoorsDrizzle,
    ];
}

/// Channels that fade together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    Weather,
    TimeOfDay,
    Context,
}

/// Current weather. Also decides how much sound the weather drowns out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Sunny,
    Cloudy,
    Drizzle,
    Rainy,
    Thunder,
    Lightning,
    AcidDrizzle,
    AcidRain,
    Flurries,
    Snow,
    Snowstorm,
}

impl Weather {
    /// Volume lost to the weather.
    pub fn sound_attenuation(self) -> i32 {
        match self {
            Weather::Clear | Weather::Sunny | Weather::Cloudy => 0,
            Weather::Drizzle => 1,
            Weather::AcidDrizzle | Weather::Flurries => 2,
            Weather::Rainy => 3,
            Weather::AcidRain | Weather::Snow => 4,
            Weather::Thunder => 5,
            Weather::Snowstorm => 6,
            Weather::Lightning => 8,
        }
    }

    pub fn is_raining(self) -> bool {
        matches!(
            self,
            Weather::Drizzle
                | Weather::Rainy
                | Weather::Thunder
                | Weather::Lightning
                | Weather::AcidDrizzle
                | Weather::AcidRain
        )
    }

    /// Outdoor loop for this weather, if it has one.
    pub fn outdoor_loop(self) -> Option<(AmbientChannel, &'static str)> {
        match self {
            Weather::Drizzle | Weather::AcidDrizzle => {
                Some((AmbientChannel::OutdoorsDrizzle, "drizzle"))
            }
            Weather::Rainy => Some((AmbientChannel::OutdoorsRain, "rain")),
            Weather::Thunder | Weather::Lightning | Weather::AcidRain => {
                Some((AmbientChannel::OutdoorsThunder, "thunder"))
            }
            Weather::Flurries => Some((AmbientChannel::OutdoorsFlurry, "flurries")),
            Weather::Snow | Weather::Snowstorm => Some((AmbientChannel::OutdoorsSnow, "snow")),
            Weather::Clear | Weather::Sunny | Weather::Cloudy => None,
        }
    }
}

/// Resource: surroundings of the listener that pick the ambient loops.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    pub weather: Weather,
    pub is_night: bool,
    /// Indoors or otherwise covered
    pub sheltered: bool,
}

/// Resource: which loops are playing, across ticks.
#[derive(Resource, Debug, Default)]
pub struct Soundscape {
    previous_weather: Option<Weather>,
    muted: bool,
}

impl Soundscape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Starts or switches ambient loops for the listener's surroundings.
    pub fn update(
        &mut self,
        listener: &ListenerState,
        conditions: &AmbientConditions,
        audio: &mut dyn AudioBackend,
        config: &AudioConfig,
    ) {
        if listener.is_asleep() {
            if !self.muted {
                audio.fade_all(config.sleep_fade_ms);
                self.muted = true;
            }
            return;
        }
        self.muted = false;

        let fade = config.ambient_fade_ms;
        let volume = ambient_volume(config);
        let deaf = listener.is_deaf();
        let underground = listener.position.z < 0;
        let sheltered = conditions.sheltered;
        let weather = conditions.weather;
        let weather_changed = self.previous_weather != Some(weather);
        self.previous_weather = Some(weather);

        if deaf {
            return;
        }

        if !sheltered && !underground {
            let (channel, variant) = if conditions.is_night {
                (AmbientChannel::NighttimeOutdoors, "nighttime")
            } else {
                (AmbientChannel::DaytimeOutdoors, "daytime")
            };
            if !audio.is_channel_playing(channel) {
                audio.fade_group(ChannelGroup::TimeOfDay, fade);
                start_loop(audio, variant, volume, channel, fade);
            }
        }

        if underground {
            if weather_changed || !audio.is_channel_playing(AmbientChannel::Underground) {
                audio.fade_group(ChannelGroup::Weather, fade);
                audio.fade_group(ChannelGroup::TimeOfDay, fade);
                start_loop(audio, "underground", volume, AmbientChannel::Underground, fade);
            }
            return;
        }

        if sheltered {
            if weather_changed || !audio.is_channel_playing(AmbientChannel::Indoors) {
                audio.fade_group(ChannelGroup::Weather, fade);
                audio.fade_group(ChannelGroup::TimeOfDay, fade);
                start_loop(audio, "indoors", volume, AmbientChannel::Indoors, fade);
            }
            if weather.is_raining() && !audio.is_channel_playing(AmbientChannel::IndoorsRain) {
                start_loop(audio, "indoors_rain", volume, AmbientChannel::IndoorsRain, fade);
            }
            return;
        }

        let weather_playing = AmbientChannel::OUTDOOR_WEATHER
            .iter()
            .any(|c| audio.is_channel_playing(*c));
        if weather_changed || !weather_playing {
            if let Some((channel, variant)) = weather.outdoor_loop() {
                audio.fade_group(ChannelGroup::Weather, fade);
                start_loop(audio, variant, volume, channel, fade);
            } else if weather_changed {
                audio.fade_group(ChannelGroup::Weather, fade);
            }
        }
    }
}

/// Playback volume for loops around the listener's own tile.
fn ambient_volume(config: &AudioConfig) -> i32 {
    ((100.0 - 1.0) * config.volume_multiplier) as i32
}

fn start_loop(
    audio: &mut dyn AudioBackend,
    variant: &str,
    volume: i32,
    channel: AmbientChannel,
    fade_ms: u32,
) {
    if let Err(e) = audio.play_ambient(ENVIRONMENT_CUE, variant, volume, channel, fade_ms) {
        warn!("Skipping ambient loop on {:?}: {}", channel, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::AudioLog;
    use crate::listener::SleeperKind;
    use sound_events::Tripoint;

    fn outdoors(weather: Weather) -> AmbientConditions {
        AmbientConditions {
            weather,
            is_night: false,
            sheltered: false,
        }
    }

    #[test]
    fn test_daytime_and_weather_loops_start() {
        let mut scape = Soundscape::new();
        let mut audio = AudioLog::new();
        let listener = ListenerState::new(Tripoint::new(0, 0, 0));

        scape.update(&listener, &outdoors(Weather::Rainy), &mut audio, &AudioConfig::default());

        assert!(audio.is_channel_playing(AmbientChannel::DaytimeOutdoors));
        assert!(audio.is_channel_playing(AmbientChannel::OutdoorsRain));
        assert!(!audio.is_channel_playing(AmbientChannel::Indoors));

        // Nothing restarts while conditions hold
        let started = audio.ambient.len();
        scape.update(&listener, &outdoors(Weather::Rainy), &mut audio, &AudioConfig::default());
        assert_eq!(audio.ambient.len(), started);
    }

    #[test]
    fn test_weather_change_switches_loop() {
        let mut scape = Soundscape::new();
        let mut audio = AudioLog::new();
        let listener = ListenerState::new(Tripoint::new(0, 0, 0));
        let config = AudioConfig::default();

        scape.update(&listener, &outdoors(Weather::Rainy), &mut audio, &config);
        scape.update(&listener, &outdoors(Weather::Snow), &mut audio, &config);

        assert!(!audio.is_channel_playing(AmbientChannel::OutdoorsRain));
        assert!(audio.is_channel_playing(AmbientChannel::OutdoorsSnow));

        scape.update(&listener, &outdoors(Weather::Clear), &mut audio, &config);
        assert!(!audio.is_channel_playing(AmbientChannel::OutdoorsSnow));
        assert!(audio.is_channel_playing(AmbientChannel::DaytimeOutdoors));
    }

    #[test]
    fn test_sheltered_and_underground() {
        let config = AudioConfig::default();
        let mut scape = Soundscape::new();
        let mut audio = AudioLog::new();
        let listener = ListenerState::new(Tripoint::new(0, 0, 0));
        let indoors = AmbientConditions {
            weather: Weather::Drizzle,
            is_night: true,
            sheltered: true,
        };

        scape.update(&listener, &indoors, &mut audio, &config);
        assert!(audio.is_channel_playing(AmbientChannel::Indoors));
        assert!(audio.is_channel_playing(AmbientChannel::IndoorsRain));
        assert!(!audio.is_channel_playing(AmbientChannel::NighttimeOutdoors));

        let mut scape = Soundscape::new();
        let mut audio = AudioLog::new();
        let cellar = ListenerState::new(Tripoint::new(0, 0, -1));
        scape.update(&cellar, &outdoors(Weather::Thunder), &mut audio, &config);
        assert!(audio.is_channel_playing(AmbientChannel::Underground));
        assert!(!audio.is_channel_playing(AmbientChannel::OutdoorsThunder));
    }

    #[test]
    fn test_sleep_mutes_once_and_deafness_suppresses() {
        let config = AudioConfig::default();
        let mut scape = Soundscape::new();
        let mut audio = AudioLog::new();
        let awake = ListenerState::new(Tripoint::new(0, 0, 0));
        scape.update(&awake, &outdoors(Weather::Clear), &mut audio, &config);
        assert!(audio.is_channel_playing(AmbientChannel::DaytimeOutdoors));

        let sleeping = awake.clone().asleep(SleeperKind::Normal);
        scape.update(&sleeping, &outdoors(Weather::Clear), &mut audio, &config);
        scape.update(&sleeping, &outdoors(Weather::Clear), &mut audio, &config);
        assert!(scape.is_muted());
        assert_eq!(audio.full_fades, 1);
        assert!(!audio.is_channel_playing(AmbientChannel::DaytimeOutdoors));

        let mut deaf = awake.clone();
        deaf.deafness_remaining = 10;
        scape.update(&deaf, &outdoors(Weather::Clear), &mut audio, &config);
        assert!(!scape.is_muted());
        assert!(!audio.is_channel_playing(AmbientChannel::DaytimeOutdoors));
    }

    #[test]
    fn test_weather_attenuation_table() {
        assert_eq!(Weather::Clear.sound_attenuation(), 0);
        assert_eq!(Weather::Lightning.sound_attenuation(), 8);
        assert!(Weather::AcidRain.is_raining());
        assert!(!Weather::Snow.is_raining());
        assert!(Weather::Sunny.outdoor_loop().is_none());
    }
}
