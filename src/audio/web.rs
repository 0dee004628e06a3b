//! Web Audio graph for the storm ambience and effects

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use web_sys::{
    AudioBufferSourceNode, AudioContext, BiquadFilterType, GainNode, OscillatorNode,
    OscillatorType,
};

use super::{
    RAIN_LOOP_SECS, SCREAM_NOISE_SECS, SoundEffect, ThunderSchedule, frames_for, rain_noise,
    scream_noise,
};
use crate::settings::Settings;

/// Looping rain: noise buffer -> low-pass -> gain
struct RainLoop {
    src: AudioBufferSourceNode,
    gain: GainNode,
}

/// Audio manager for the game. The context only exists while audio is on.
pub struct AudioManager {
    ctx: Option<AudioContext>,
    rain: Option<RainLoop>,
    thunder: ThunderSchedule,
    rng: Pcg32,
    sfx_volume: f32,
    ambience_volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            ctx: None,
            rain: None,
            thunder: ThunderSchedule::default(),
            rng: Pcg32::seed_from_u64(seed),
            sfx_volume: settings.effective_sfx_volume(),
            ambience_volume: settings.effective_ambience_volume(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.ctx.is_some()
    }

    /// Create the context and start the rain loop. No-op if already running.
    pub fn start(&mut self) {
        if self.ctx.is_some() {
            return;
        }
        let ctx = match AudioContext::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!("Failed to create AudioContext - audio disabled: {e:?}");
                return;
            }
        };

        self.rain = self.start_rain(&ctx);
        if self.rain.is_none() {
            log::warn!("Rain loop unavailable");
        }
        self.thunder.reset();
        self.ctx = Some(ctx);
        log::info!("Audio started");
    }

    /// Tear everything down. Failures during teardown are ignored.
    pub fn stop(&mut self) {
        let Some(ctx) = self.ctx.take() else { return };
        if let Some(rain) = self.rain.take() {
            rain.src.stop().ok();
            rain.gain.disconnect().ok();
        }
        ctx.close().ok();
        log::info!("Audio stopped");
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Advance the storm by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.ctx.is_some() && self.thunder.advance(dt, &mut self.rng) {
            self.play(SoundEffect::Thunder);
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = if effect.is_ambient() {
            self.ambience_volume
        } else {
            self.sfx_volume
        };
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.ctx.clone() else { return };
        self.resume();

        match effect {
            SoundEffect::Thunder => self.play_thunder(&ctx, vol),
            SoundEffect::Scream => self.play_scream(&ctx, vol),
            SoundEffect::Alarm => Self::play_alarm(&ctx, vol),
            SoundEffect::Whoosh => Self::play_whoosh(&ctx, vol),
        }
    }

    fn start_rain(&mut self, ctx: &AudioContext) -> Option<RainLoop> {
        let rate = ctx.sample_rate();
        let mut noise = rain_noise(frames_for(RAIN_LOOP_SECS, rate), &mut self.rng);
        let buffer = ctx.create_buffer(1, noise.len() as u32, rate).ok()?;
        buffer.copy_to_channel(&mut noise, 0).ok()?;

        let src = ctx.create_buffer_source().ok()?;
        src.set_buffer(Some(&buffer));
        src.set_loop(true);

        let lowpass = ctx.create_biquad_filter().ok()?;
        lowpass.set_type(BiquadFilterType::Lowpass);
        lowpass.frequency().set_value(4500.0);

        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(0.08 * self.ambience_volume);

        src.connect_with_audio_node(&lowpass).ok()?;
        lowpass.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        src.start().ok()?;

        Some(RainLoop { src, gain })
    }

    // === Sound generators ===

    /// Oscillator -> [filter] -> gain -> destination
    fn voice(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
        filter: Option<(BiquadFilterType, f32)>,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        match filter {
            Some((kind, cutoff)) => {
                let bq = ctx.create_biquad_filter().ok()?;
                bq.set_type(kind);
                bq.frequency().set_value(cutoff);
                osc.connect_with_audio_node(&bq).ok()?;
                bq.connect_with_audio_node(&gain).ok()?;
            }
            None => {
                osc.connect_with_audio_node(&gain).ok()?;
            }
        }
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Thunder - low filtered rumble with a slow tail
    fn play_thunder(&mut self, ctx: &AudioContext, vol: f32) {
        let freq = 80.0 + self.rng.random::<f32>() * 40.0;
        let Some((osc, gain)) = Self::voice(
            ctx,
            freq,
            OscillatorType::Sine,
            Some((BiquadFilterType::Lowpass, 800.0)),
        ) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.35 * vol, t + 0.06)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + 2.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 2.3).ok();
    }

    /// Scream - shrill descending saw plus a short noise bite
    fn play_scream(&mut self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = Self::voice(ctx, 1200.0, OscillatorType::Sawtooth, None) {
            osc.frequency().set_value_at_time(1200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.12)
                .ok();
            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.6 * vol, t + 0.02)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.0001, t + 0.9)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.0).ok();
        }

        self.play_noise_bite(ctx, vol);
    }

    fn play_noise_bite(&mut self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let rate = ctx.sample_rate();
        let mut noise = scream_noise(frames_for(SCREAM_NOISE_SECS, rate), &mut self.rng);
        let buffer = ctx.create_buffer(1, noise.len() as u32, rate).ok()?;
        buffer.copy_to_channel(&mut noise, 0).ok()?;

        let src = ctx.create_buffer_source().ok()?;
        src.set_buffer(Some(&buffer));
        let highpass = ctx.create_biquad_filter().ok()?;
        highpass.set_type(BiquadFilterType::Highpass);
        highpass.frequency().set_value(800.0);
        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(vol);

        src.connect_with_audio_node(&highpass).ok()?;
        highpass.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        src.start().ok()
    }

    /// Alarm - short square beep when a kid spots the ghost
    fn play_alarm(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::voice(ctx, 900.0, OscillatorType::Square, None) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.16 * vol, t + 0.01)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.00001, t + 0.35)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.36).ok();
    }

    /// Whoosh - faint triangle blip for a scare at nothing
    fn play_whoosh(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::voice(ctx, 1100.0, OscillatorType::Triangle, None) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.05 * vol, t + 0.01)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.00001, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.26).ok();
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        self.stop();
    }
}
