use std::collections::HashMap;
use std::time::{Duration, Instant};

use kira::{
    manager::{AudioManager as KiraManager, AudioManagerSettings, backend::DefaultBackend},
    sound::{
        PlaybackState,
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    },
    tween::Tween,
    Volume,
};
use tracing::{debug, info, warn};

use crate::error::AudioError;
use crate::resources::ResourceManager;

/// Linear volume ramp applied when a sound starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeIn {
    pub start: f32,
    pub end: f32,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayOptions {
    /// Restart from the beginning if the sound is already playing.
    pub reset: bool,
    pub fade_in: Option<FadeIn>,
}

struct Playing {
    key: String,
    /// `None` when running without an audio device.
    handle: Option<StaticSoundHandle>,
    /// Extra plays queued after this one; `None` loops forever.
    loops_remaining: Option<u32>,
    repeatable: bool,
    /// Volume factor the sound settles at, before global volume and mute.
    volume: f32,
    /// When the fade-in reaches `volume`.
    fade_ends: Option<Instant>,
}

/// Global volume, mute and looping on top of kira.
pub struct AudioManager {
    /// `None` when audio hardware is unavailable (headless / CI / no audio device).
    backend: Option<KiraManager>,
    sounds: HashMap<String, StaticSoundData>,
    playing: Vec<Playing>,
    global_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self { Self::headless() }
}

impl AudioManager {
    /// A manager with no backend: everything is tracked, nothing is heard.
    pub fn headless() -> Self {
        Self {
            backend: None,
            sounds: HashMap::new(),
            playing: Vec::new(),
            global_volume: 1.0,
            muted: false,
        }
    }

    /// Open the default audio device, degrading to headless on failure.
    pub fn new() -> Self {
        let mut manager = Self::headless();
        manager.start();
        manager
    }

    /// Open the audio device if it isn't open yet. Returns whether a device
    /// is available afterwards.
    pub fn start(&mut self) -> bool {
        if self.backend.is_none() {
            match KiraManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
                Ok(backend) => {
                    info!("audio_started");
                    self.backend = Some(backend);
                }
                Err(e) => warn!(error = %e, "audio_unavailable"),
            }
        }
        self.backend.is_some()
    }

    /// Returns true if audio hardware is available.
    pub fn is_available(&self) -> bool { self.backend.is_some() }

    pub fn global_volume(&self) -> f32 { self.global_volume }
    pub fn is_muted(&self) -> bool { self.muted }
    pub fn playing_count(&self) -> usize { self.playing.len() }

    pub fn is_playing(&self, key: &str) -> bool {
        self.playing.iter().any(|p| p.key == key)
    }

    /// Effective volume of the first playing instance of `key`, once any
    /// fade-in has finished.
    pub fn sound_volume(&self, key: &str) -> Option<f32> {
        self.playing
            .iter()
            .find(|p| p.key == key)
            .map(|p| self.effective_volume(p.volume) as f32)
    }

    pub fn load_sound(&mut self, key: impl Into<String>, data: StaticSoundData) {
        self.sounds.insert(key.into(), data);
    }

    /// Register a sound stored in the resource manager under the same key.
    pub fn load_from_resources(&mut self, resources: &ResourceManager, key: &str) -> Result<(), AudioError> {
        let data = resources.get_sound(key).ok_or_else(|| AudioError::UnknownSound(key.to_string()))?;
        self.sounds.insert(key.to_string(), data.clone());
        Ok(())
    }

    pub fn has_sound(&self, key: &str) -> bool {
        self.sounds.contains_key(key)
    }

    /// Change the volume of every sound, including those already playing.
    pub fn set_global_volume(&mut self, volume: f32) {
        self.global_volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.apply_volume();
    }

    /// Play `key`. A non-repeatable sound that is already playing is only
    /// restarted when `options.reset` is set.
    pub fn play(&mut self, key: &str, options: PlayOptions) -> Result<(), AudioError> {
        if let Some(index) = self.playing.iter().position(|p| p.key == key && !p.repeatable) {
            if options.reset {
                if let Some(handle) = self.playing[index].handle.as_mut() {
                    let _ = handle.seek_to(0.0);
                }
            }
            return Ok(());
        }
        self.start_sound(key, options.fade_in, Some(0), false)
    }

    /// Play a fresh instance of `key`, even if others are already playing.
    pub fn play_repeatable(&mut self, key: &str, fade_in: Option<FadeIn>) -> Result<(), AudioError> {
        self.start_sound(key, fade_in, Some(0), true)
    }

    /// Play `key` `count` times in a row, or forever when `count` is `None`.
    pub fn play_loop(&mut self, key: &str, count: Option<u32>) -> Result<(), AudioError> {
        match count {
            Some(0) => Ok(()),
            Some(n) => self.start_sound(key, None, Some(n - 1), false),
            None => self.start_sound(key, None, None, false),
        }
    }

    /// Stop everything, fading out over `fade_out` when given.
    pub fn stop_all(&mut self, fade_out: Option<Duration>) {
        let tween = Tween { duration: fade_out.unwrap_or(Duration::ZERO), ..Default::default() };
        for mut p in self.playing.drain(..) {
            if let Some(handle) = p.handle.as_mut() {
                let _ = handle.stop(tween);
            }
        }
        debug!("audio_stopped_all");
    }

    /// Drop finished sounds and restart counted loops. Call once per tick.
    pub fn update(&mut self) {
        let mut restarts = Vec::new();
        self.playing.retain(|p| {
            let finished = p.handle.as_ref().is_some_and(|h| h.state() == PlaybackState::Stopped);
            if finished {
                if let Some(n) = p.loops_remaining.filter(|n| *n > 0) {
                    restarts.push((p.key.clone(), n - 1, p.repeatable));
                }
            }
            !finished
        });

        for (key, remaining, repeatable) in restarts {
            if let Err(e) = self.start_sound(&key, None, Some(remaining), repeatable) {
                warn!(key = %key, error = %e, "audio_loop_restart_failed");
            }
        }
    }

    fn effective_volume(&self, factor: f32) -> f64 {
        if self.muted { 0.0 } else { (self.global_volume * factor) as f64 }
    }

    fn apply_volume(&mut self) {
        let now = Instant::now();
        let (global, muted) = (self.global_volume, self.muted);
        for p in &mut self.playing {
            let Some(handle) = p.handle.as_mut() else { continue };
            let volume = if muted { 0.0 } else { (global * p.volume) as f64 };
            // A running fade keeps its end time.
            let duration = p.fade_ends.map_or(Duration::ZERO, |end| end.saturating_duration_since(now));
            let _ = handle.set_volume(Volume::Amplitude(volume), Tween { duration, ..Default::default() });
        }
    }

    fn start_sound(
        &mut self,
        key: &str,
        fade_in: Option<FadeIn>,
        loops_remaining: Option<u32>,
        repeatable: bool,
    ) -> Result<(), AudioError> {
        let data = self.sounds.get(key).ok_or_else(|| AudioError::UnknownSound(key.to_string()))?;

        let handle = match self.backend.as_mut() {
            Some(backend) => {
                let mut settings = match loops_remaining {
                    None => StaticSoundSettings::new().loop_region(0.0..),
                    Some(_) => StaticSoundSettings::new(),
                };
                let start = fade_in.map_or(1.0, |f| f.start);
                let volume = if self.muted { 0.0 } else { (self.global_volume * start) as f64 };
                settings.volume = Volume::Amplitude(volume).into();

                let mut handle = backend
                    .play(data.clone().with_settings(settings))
                    .map_err(|e| AudioError::Playback { key: key.to_string(), message: e.to_string() })?;

                if let Some(fade) = fade_in {
                    let _ = handle.set_volume(
                        Volume::Amplitude(self.effective_volume(fade.end)),
                        Tween { duration: fade.duration, ..Default::default() },
                    );
                }
                Some(handle)
            }
            None => None,
        };

        self.playing.push(Playing {
            key: key.to_string(),
            handle,
            loops_remaining,
            repeatable,
            volume: fade_in.map_or(1.0, |f| f.end),
            fade_ends: fade_in.map(|f| Instant::now() + f.duration),
        });
        Ok(())
    }
}
