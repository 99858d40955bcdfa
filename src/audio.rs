//! Sound effects
//!
//! The simulation never plays audio itself. The game facade forwards events
//! to an [`EffectSink`]; on the web that is [`AudioManager`], which
//! synthesizes every effect with the Web Audio API (no external files).
//! Playback failures are reported but never affect the game.

use std::fmt;

use glam::Vec3;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Run started
    Launch,
    /// Crystal collected
    CrystalPickup,
    /// Board destroyed by an obstacle
    Explosion,
    /// Run beat the stored high score
    HighScore,
}

/// Why an effect could not be played
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// No audio backend (e.g. AudioContext creation failed)
    Unavailable,
    /// The backend refused playback (e.g. autoplay policy)
    Rejected(String),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::Unavailable => write!(f, "audio backend unavailable"),
            EffectError::Rejected(reason) => write!(f, "playback rejected: {reason}"),
        }
    }
}

impl std::error::Error for EffectError {}

/// Fire-and-forget receiver for audio/particle effects
pub trait EffectSink {
    /// Play `effect`, optionally anchored at a world position for particles
    fn play_effect(&mut self, effect: SoundEffect, at: Option<Vec3>) -> Result<(), EffectError>;
}

/// Sink that drops every effect (native builds, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl EffectSink for SilentAudio {
    fn play_effect(&mut self, _effect: SoundEffect, _at: Option<Vec3>) -> Result<(), EffectError> {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use glam::Vec3;
    use web_sys::{AudioContext, AudioContextState, OscillatorType};

    use super::{EffectError, EffectSink, SoundEffect};
    use crate::settings::Settings;

    /// One synthesized voice: a pitch sweep under a decaying envelope
    #[derive(Clone, Copy)]
    struct Tone {
        wave: OscillatorType,
        from_hz: f32,
        to_hz: f32,
        /// Peak gain relative to the effect volume
        level: f32,
        /// Seconds after the trigger
        delay: f64,
        length: f64,
    }

    impl Tone {
        const fn sweep(
            wave: OscillatorType,
            from_hz: f32,
            to_hz: f32,
            level: f32,
            length: f64,
        ) -> Self {
            Self {
                wave,
                from_hz,
                to_hz,
                level,
                delay: 0.0,
                length,
            }
        }

        const fn note(wave: OscillatorType, hz: f32, level: f32, delay: f64, length: f64) -> Self {
            Self {
                wave,
                from_hz: hz,
                to_hz: hz,
                level,
                delay,
                length,
            }
        }
    }

    const LAUNCH: &[Tone] = &[Tone::sweep(OscillatorType::Sawtooth, 180.0, 720.0, 0.22, 0.4)];

    const CRYSTAL: &[Tone] = &[
        Tone::note(OscillatorType::Sine, 988.0, 0.2, 0.0, 0.16),
        Tone::note(OscillatorType::Sine, 1319.0, 0.18, 0.04, 0.16),
        Tone::note(OscillatorType::Triangle, 1976.0, 0.12, 0.08, 0.2),
    ];

    const EXPLOSION: &[Tone] = &[
        Tone::sweep(OscillatorType::Sawtooth, 120.0, 30.0, 0.5, 0.7),
        Tone::sweep(OscillatorType::Square, 1800.0, 400.0, 0.15, 0.12),
    ];

    const HIGH_SCORE: &[Tone] = &[
        Tone::note(OscillatorType::Triangle, 523.0, 0.22, 0.5, 0.25),
        Tone::note(OscillatorType::Triangle, 659.0, 0.22, 0.6, 0.25),
        Tone::note(OscillatorType::Triangle, 784.0, 0.22, 0.7, 0.25),
        Tone::note(OscillatorType::Triangle, 1047.0, 0.25, 0.8, 0.45),
    ];

    fn tones(effect: SoundEffect) -> &'static [Tone] {
        match effect {
            SoundEffect::Launch => LAUNCH,
            SoundEffect::CrystalPickup => CRYSTAL,
            SoundEffect::Explosion => EXPLOSION,
            SoundEffect::HighScore => HIGH_SCORE,
        }
    }

    /// Procedural Web Audio backend
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Fails outside a secure context or with audio disabled
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("AudioContext unavailable, effects disabled");
            }
            Self {
                ctx,
                volume: Settings::default().effective_volume(),
                muted: false,
            }
        }

        /// Take volumes and mute state from the player's settings
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.muted = settings.muted;
            self.volume = Settings {
                muted: false,
                ..settings.clone()
            }
            .effective_volume();
        }

        /// Unlock playback; only effective inside a user gesture
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn voice(
            ctx: &AudioContext,
            tone: &Tone,
            volume: f32,
        ) -> Result<(), wasm_bindgen::JsValue> {
            let osc = ctx.create_oscillator()?;
            let gain = ctx.create_gain()?;
            osc.set_type(tone.wave);
            osc.connect_with_audio_node(&gain)?;
            gain.connect_with_audio_node(&ctx.destination())?;

            let start = ctx.current_time() + tone.delay;
            let end = start + tone.length;
            gain.gain().set_value_at_time(volume * tone.level, start)?;
            gain.gain().exponential_ramp_to_value_at_time(0.001, end)?;
            osc.frequency().set_value_at_time(tone.from_hz, start)?;
            if tone.to_hz != tone.from_hz {
                osc.frequency().exponential_ramp_to_value_at_time(tone.to_hz, end)?;
            }
            osc.start_with_when(start)?;
            osc.stop_with_when(end + 0.05)?;
            Ok(())
        }
    }

    impl EffectSink for AudioManager {
        fn play_effect(
            &mut self,
            effect: SoundEffect,
            _at: Option<Vec3>,
        ) -> Result<(), EffectError> {
            if self.muted || self.volume <= 0.0 {
                return Ok(());
            }
            let Some(ctx) = &self.ctx else {
                return Err(EffectError::Unavailable);
            };
            // Browsers keep the context suspended until a user gesture
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
                return Err(EffectError::Rejected("audio context suspended".into()));
            }

            for tone in tones(effect) {
                Self::voice(ctx, tone, self.volume)
                    .map_err(|e| EffectError::Rejected(format!("{e:?}")))?;
            }
            Ok(())
        }
    }
}
