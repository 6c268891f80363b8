use std::f32::consts::TAU;

use crate::audio_api::{NoteRequest, Waveform};

use super::effect::LowpassFilter;
use super::param::AutomatedParam;

// Envelope shape shared by every note.
const SYNTH_LEVEL: f32 = 0.1;
const ATTACK_SECS: f32 = 0.04;
const GLIDE_SECS: f32 = 0.005;
const FILTER_Q_DB: f32 = 10.0;

#[derive(Clone, Copy, Debug)]
struct Oscillator {
    wave: Waveform,
    phase: f32, // 0..1
}

impl Oscillator {
    fn new(wave: Waveform) -> Self {
        Self { wave, phase: 0.0 }
    }

    #[inline]
    fn next(&mut self, freq: f32, sample_rate: f32) -> f32 {
        let p = self.phase;
        let out = match self.wave {
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 { 1.0 } else { -1.0 }
            }
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            Waveform::Sine => (p * TAU).sin(),
        };
        self.phase += freq / sample_rate;
        self.phase -= self.phase.floor();
        out
    }
}

/// Oscillator into a resonant lowpass into a decaying amp.
#[derive(Clone, Debug)]
pub struct MonoSynth {
    osc: Oscillator,
    filter: LowpassFilter,
    frequency: AutomatedParam,
    cutoff: AutomatedParam,
    amp: AutomatedParam,
}

impl MonoSynth {
    pub fn new(wave: Waveform, sample_rate: f32) -> Self {
        Self {
            osc: Oscillator::new(wave),
            filter: LowpassFilter::new(440.0, FILTER_Q_DB, sample_rate),
            frequency: AutomatedParam::new(110.0),
            cutoff: AutomatedParam::new(440.0),
            amp: AutomatedParam::new(0.0),
        }
    }

    /// Schedules a note starting at sample `start`. `detune` is a small
    /// relative pitch error (e.g. 0.003 for +0.3%).
    pub fn play(&mut self, note: NoteRequest, start: u64, detune: f32, sample_rate: f32) {
        let decay = note.decay as f32;
        let cutoff = note.filter_frequency as f32;
        let attack_end = start + (ATTACK_SECS * sample_rate) as u64;

        self.frequency.cancel_scheduled_values(start);
        self.frequency
            .set_target_at_time((1.0 + detune) * note.frequency as f32, start, GLIDE_SECS, sample_rate);

        self.amp.cancel_scheduled_values(start);
        self.amp.set_target_at_time(SYNTH_LEVEL, start, ATTACK_SECS, sample_rate);
        self.amp.set_target_at_time(0.0, attack_end, decay, sample_rate);

        self.cutoff.cancel_scheduled_values(start);
        self.cutoff.set_target_at_time(cutoff, start, ATTACK_SECS, sample_rate);
        self.cutoff.set_target_at_time(cutoff / 2.0, attack_end, decay / 2.0, sample_rate);
    }

    #[inline]
    pub fn next(&mut self, now: u64, sample_rate: f32) -> f32 {
        let freq = self.frequency.next(now);
        let cutoff = self.cutoff.next(now);
        let amp = self.amp.next(now);
        self.filter.set_cutoff(cutoff, sample_rate);
        let raw = self.osc.next(freq, sample_rate);
        self.filter.process(raw) * amp
    }
}

/// Sine kick: short click of gain with a fast downward pitch sweep.
#[derive(Clone, Debug)]
pub struct Kick {
    osc: Oscillator,
    frequency: AutomatedParam,
    amp: AutomatedParam,
}

impl Kick {
    pub fn new() -> Self {
        Self {
            osc: Oscillator::new(Waveform::Sine),
            frequency: AutomatedParam::new(440.0),
            amp: AutomatedParam::new(0.0),
        }
    }

    pub fn play(&mut self, start: u64, sample_rate: f32) {
        let body = start + (0.002 * sample_rate) as u64;

        self.amp.cancel_scheduled_values(start);
        self.amp.set_target_at_time(0.3, start, 0.002, sample_rate);
        self.amp.set_target_at_time(0.0, body, 0.1, sample_rate);

        self.frequency.cancel_scheduled_values(start);
        self.frequency.set_target_at_time(440.0, start, 0.002, sample_rate);
        self.frequency.set_target_at_time(55.0, body, 0.02, sample_rate);
    }

    #[inline]
    pub fn next(&mut self, now: u64, sample_rate: f32) -> f32 {
        let freq = self.frequency.next(now);
        let amp = self.amp.next(now);
        self.osc.next(freq, sample_rate) * amp
    }
}
