//! Sound effects
//!
//! The simulation only emits [`SoundEffect`] values. In the browser they are
//! synthesized with the Web Audio API; there are no sound files.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Pointer pressed on the play field
    Click,
    /// Fast swipe connected with a target
    Slice,
    /// Slow swipe brushed a target
    Graze,
    /// Target destroyed
    Smash,
    /// Slow-motion window started
    SlowMotion,
    GameOver,
    HighScore,
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;

    /// Web Audio sound player
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect; failures are ignored
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Click => self.play_click(ctx, vol),
                SoundEffect::Slice => self.play_slice(ctx, vol, 1.0),
                SoundEffect::Graze => self.play_slice(ctx, vol * 0.5, 0.6),
                SoundEffect::Smash => self.play_smash(ctx, vol),
                SoundEffect::SlowMotion => self.play_slow_motion(ctx, vol),
                SoundEffect::GameOver => {
                    self.play_arpeggio(ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2, OscillatorType::Sine)
                }
                SoundEffect::HighScore => self.play_arpeggio(
                    ctx,
                    vol * 0.8,
                    &[500.0, 600.0, 700.0, 800.0, 1000.0],
                    0.08,
                    OscillatorType::Triangle,
                ),
            }
        }

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

        /// Short tick
        fn play_click(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.08, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.001, t + 0.03).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.04).ok();
        }

        /// Blade swish, pitch-scaled so grazes sound duller
        fn play_slice(&self, ctx: &AudioContext, vol: f32, pitch: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1800.0 * pitch, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.12).ok();
            osc.frequency().set_value_at_time(1800.0 * pitch, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(400.0 * pitch, t + 0.12)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Crunch plus low thump
        fn play_smash(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            if let Some((osc, gain)) = self.create_osc(ctx, 2500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.1).ok();
                osc.frequency().set_value_at_time(2500.0, t).ok();
                osc.frequency().set_value_at_time(900.0, t + 0.02).ok();
                osc.frequency().set_value_at_time(3000.0, t + 0.04).ok();
                osc.frequency().set_value_at_time(600.0, t + 0.06).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.12).ok();
            }
            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.2).ok();
                osc.frequency().exponential_ramp_to_value_at_time(45.0, t + 0.2).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }

        /// Long downward sweep
        fn play_slow_motion(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 1.2).ok();
            osc.frequency().set_value_at_time(600.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(90.0, t + 1.2).ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.3).ok();
        }

        /// Notes played one after another
        fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], spacing: f64, osc_type: OscillatorType) {
            for (i, freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * spacing;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.3).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}
