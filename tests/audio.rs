use std::io::Cursor;
use std::time::Duration;

use kira::sound::static_sound::StaticSoundData;

use cadence2d::audio::{AudioManager, FadeIn, PlayOptions};
use cadence2d::error::AudioError;
use cadence2d::resources::{Resource, ResourceManager};

// ── helpers ───────────────────────────────────────────────────────────────────

/// A short silent 16-bit mono PCM wav.
fn silent_wav() -> Vec<u8> {
    let data_len: u32 = 200;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&44_100u32.to_le_bytes());
    bytes.extend_from_slice(&88_200u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);
    bytes
}

fn sound() -> StaticSoundData {
    StaticSoundData::from_cursor(Cursor::new(silent_wav())).unwrap()
}

/// Headless manager with "blip" registered.
fn manager() -> AudioManager {
    let mut audio = AudioManager::headless();
    audio.load_sound("blip", sound());
    audio
}

// ── setup ─────────────────────────────────────────────────────────────────────

#[test]
fn headless_has_no_device() {
    let audio = AudioManager::default();
    assert!(!audio.is_available());
    assert_eq!(audio.global_volume(), 1.0);
    assert!(!audio.is_muted());
}

#[test]
fn sounds_register_from_resources() {
    let mut resources = ResourceManager::new(".");
    resources.insert("jump", Resource::Sound(sound()));

    let mut audio = AudioManager::headless();
    audio.load_from_resources(&resources, "jump").unwrap();
    assert!(audio.has_sound("jump"));

    let err = audio.load_from_resources(&resources, "land").unwrap_err();
    assert!(matches!(err, AudioError::UnknownSound(key) if key == "land"));
}

// ── playback ──────────────────────────────────────────────────────────────────

#[test]
fn unknown_sound_cannot_play() {
    let mut audio = manager();
    assert!(matches!(audio.play("nope", PlayOptions::default()), Err(AudioError::UnknownSound(_))));
    assert_eq!(audio.playing_count(), 0);
}

/// A sound that is already playing is not started twice.
#[test]
fn play_is_not_repeatable() {
    let mut audio = manager();
    audio.play("blip", PlayOptions::default()).unwrap();
    audio.play("blip", PlayOptions { reset: true, ..Default::default() }).unwrap();

    assert!(audio.is_playing("blip"));
    assert_eq!(audio.playing_count(), 1);
}

#[test]
fn repeatable_sounds_overlap() {
    let mut audio = manager();
    let fade = FadeIn { start: 0.0, end: 1.0, duration: Duration::from_millis(100) };
    audio.play_repeatable("blip", Some(fade)).unwrap();
    audio.play_repeatable("blip", None).unwrap();
    assert_eq!(audio.playing_count(), 2);
}

#[test]
fn loop_of_zero_plays_nothing() {
    let mut audio = manager();
    audio.play_loop("blip", Some(0)).unwrap();
    assert_eq!(audio.playing_count(), 0);

    audio.play_loop("blip", Some(3)).unwrap();
    audio.play_loop("blip", None).unwrap();
    assert_eq!(audio.playing_count(), 2);
}

#[test]
fn stop_all_clears_playing() {
    let mut audio = manager();
    audio.play_repeatable("blip", None).unwrap();
    audio.play_loop("blip", None).unwrap();
    audio.stop_all(Some(Duration::from_millis(50)));

    assert_eq!(audio.playing_count(), 0);
    assert!(!audio.is_playing("blip"));
}

/// Without a device nothing ever finishes on its own.
#[test]
fn headless_update_keeps_sounds() {
    let mut audio = manager();
    audio.play("blip", PlayOptions::default()).unwrap();
    for _ in 0..10 {
        audio.update();
    }
    assert!(audio.is_playing("blip"));
}

// ── volume ────────────────────────────────────────────────────────────────────

#[test]
fn global_volume_is_clamped() {
    let mut audio = manager();
    audio.set_global_volume(1.5);
    assert_eq!(audio.global_volume(), 1.0);
    audio.set_global_volume(-0.2);
    assert_eq!(audio.global_volume(), 0.0);
    audio.set_global_volume(0.3);
    assert_eq!(audio.global_volume(), 0.3);
}

/// Global volume scales the level a sound faded in to, not full volume.
#[test]
fn global_volume_keeps_fade_target() {
    let mut audio = manager();
    let fade = FadeIn { start: 0.0, end: 0.5, duration: Duration::from_millis(100) };
    audio.play("blip", PlayOptions { fade_in: Some(fade), ..Default::default() }).unwrap();
    assert_eq!(audio.sound_volume("blip"), Some(0.5));

    audio.set_global_volume(0.8);
    assert_eq!(audio.sound_volume("blip"), Some(0.4));

    audio.toggle_mute();
    assert_eq!(audio.sound_volume("blip"), Some(0.0));
    audio.toggle_mute();
    assert_eq!(audio.sound_volume("blip"), Some(0.4));
    assert_eq!(audio.sound_volume("missing"), None);
}

#[test]
fn mute_toggles_and_keeps_volume() {
    let mut audio = manager();
    audio.set_global_volume(0.5);
    audio.toggle_mute();
    assert!(audio.is_muted());
    assert_eq!(audio.global_volume(), 0.5);
    audio.toggle_mute();
    assert!(!audio.is_muted());
}
