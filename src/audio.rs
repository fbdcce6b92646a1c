//! Audio boundary
//!
//! The simulation only reports what happened; this module decides which
//! sound goes with each event and at what volume. Actual playback sits
//! behind the `AudioSink` trait so hosts can plug in any backend.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player left the ground
    Jump,
    /// Player died
    Death,
    /// A new piece started falling
    Fall,
    /// A piece came to rest
    Land,
    /// Extra jump unlocked
    LevelUp,
}

impl SoundEffect {
    /// Effect that accompanies a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::Death { .. } => Some(SoundEffect::Death),
            GameEvent::PieceSpawned { .. } => Some(SoundEffect::Fall),
            GameEvent::PieceLanded { .. } => Some(SoundEffect::Land),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::MusicVolume(_) | GameEvent::QuitRequested => None,
        }
    }
}

/// Playback backend
pub trait AudioSink {
    /// Start a one-shot effect at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
    /// Set the looping background music volume (0.0 - 1.0)
    fn set_music_volume(&mut self, volume: f32);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("Play {:?} at {:.2}", effect, volume);
    }

    fn set_music_volume(&mut self, volume: f32) {
        log::debug!("Music volume {:.2}", volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    /// Last music level requested by the game, in percent
    music_level: u8,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        Self {
            sink,
            master_volume: settings.master_volume,
            sfx_volume: settings.sfx_volume,
            music_volume: settings.music_volume,
            music_level: 0,
            muted: false,
        }
    }

    /// Pick up changed volumes from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.push_music_volume();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.push_music_volume();
    }

    fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume * self.music_level as f32 / 100.0
        }
    }

    fn push_music_volume(&mut self) {
        let volume = self.effective_music_volume();
        self.sink.set_music_volume(volume);
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    pub fn handle_event(&mut self, event: &GameEvent) {
        if let GameEvent::MusicVolume(level) = event {
            self.music_level = *level;
            self.push_music_volume();
        } else if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn handle_events<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
