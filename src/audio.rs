//! Advisory audio cues
//!
//! The engine announces what happened; a sink decides what (if anything) to
//! play. Sinks must never fail loudly: no sound is not a failed spin.

use crate::settings::AudioSettings;

/// Moments the engine announces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Wheel started turning
    SpinStarted,
    /// Wheel stopped (finished or cancelled)
    SpinEnded,
    /// A winner was decided
    WinnerDecided,
}

/// Fire-and-forget receiver for audio cues
pub trait AudioSink {
    fn cue(&self, cue: AudioCue);

    /// Apply new volume/enable preferences
    fn configure(&self, _settings: &AudioSettings) {}
}

/// Sink that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn cue(&self, _cue: AudioCue) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    //! Procedurally generated cues via the Web Audio API - no media files needed

    use std::cell::RefCell;

    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, AudioSink};
    use crate::settings::AudioSettings;

    /// Number of ticks in the spin-start flourish
    const SPIN_TICKS: u32 = 8;

    /// Audio manager for the wheel
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        settings: RefCell<AudioSettings>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new(AudioSettings::default())
        }
    }

    impl AudioManager {
        pub fn new(settings: AudioSettings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                settings: RefCell::new(settings),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Spin start - accelerating ratchet clicks
        fn play_spin_start(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            let mut offset = 0.0;
            for i in 0..SPIN_TICKS {
                let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) else {
                    return;
                };
                let at = t + offset;
                gain.gain().set_value_at_time(vol * 0.15, at).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.001, at + 0.03)
                    .ok();
                osc.start_with_when(at).ok();
                osc.stop_with_when(at + 0.04).ok();
                // Ticks bunch up as the wheel gets going
                offset += 0.12 - 0.012 * i as f64;
            }
        }

        /// Spin end - soft thunk of the pointer settling
        fn play_spin_end(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(70.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Winner - rising major arpeggio
        fn play_winner(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            let notes = [523.25, 659.25, 783.99, 1046.5];

            for (i, &freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                    return;
                };
                let start = t + i as f64 * 0.1;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.35)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.4).ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn cue(&self, cue: AudioCue) {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let settings = self.settings.borrow();
            match cue {
                AudioCue::SpinStarted => {
                    let vol = settings.spin_gain();
                    if vol > 0.0 {
                        self.play_spin_start(ctx, vol);
                    }
                }
                AudioCue::SpinEnded => {
                    let vol = settings.spin_gain();
                    if vol > 0.0 {
                        self.play_spin_end(ctx, vol);
                    }
                }
                AudioCue::WinnerDecided => {
                    let vol = settings.winner_gain();
                    if vol > 0.0 {
                        self.play_winner(ctx, vol);
                    }
                }
            }
        }

        fn configure(&self, settings: &AudioSettings) {
            *self.settings.borrow_mut() = settings.clone();
        }
    }
}
