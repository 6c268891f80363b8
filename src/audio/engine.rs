use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio_api::{AudioCommand, SmoothedParam, Waveform};
use crate::pipeline::config::PartConfig;

use super::effect::{Effect, FeedbackDelay, Panner, SoftClip};
use super::frame::StereoFrame;
use super::voice::{Kick, MonoSynth};

/// Commands take effect this far ahead of the block they arrive in.
const SCHEDULE_AHEAD_SECS: f32 = 0.01;
const INITIAL_FEEDBACK: f32 = 0.5;
/// Echo lands three sixteenths later, give or take this much per part.
const DELAY_JITTER_SECS: f32 = 0.01;
/// Max relative pitch error per note (+/-).
const DETUNE: f32 = 0.005;

/// How the synth voices one part.
#[derive(Clone, Copy, Debug)]
pub struct Voicing {
    pub wave: Waveform,
    pub pan: f32,
}

impl From<&PartConfig> for Voicing {
    fn from(p: &PartConfig) -> Self {
        Self { wave: p.wave, pan: p.pan as f32 }
    }
}

// synth -> panner, synth -> delay, delay feedback -> panner
struct VoiceChain {
    synth: MonoSynth,
    delay: FeedbackDelay,
    panner: Panner,
}

pub struct Engine {
    sample_rate: f32,
    now: u64,
    voices: Vec<VoiceChain>, // one per part, fixed after construction
    kick: Kick,
    master: SoftClip,
    rng: Pcg32,
}

impl Engine {
    pub fn new(sample_rate: u32, voicings: &[Voicing], seconds_per_step: f64, seed: u64) -> Self {
        let sample_rate = sample_rate as f32;
        let mut rng = Pcg32::seed_from_u64(seed);
        let voices = voicings
            .iter()
            .map(|v| {
                let jitter = rng.gen_range(-DELAY_JITTER_SECS..DELAY_JITTER_SECS);
                let delay_secs = (seconds_per_step as f32 * 3.0 + jitter).max(0.001);
                VoiceChain {
                    synth: MonoSynth::new(v.wave, sample_rate),
                    delay: FeedbackDelay::new(delay_secs, INITIAL_FEEDBACK, sample_rate),
                    panner: Panner::new(v.pan),
                }
            })
            .collect();

        Self {
            sample_rate,
            now: 0,
            voices,
            kick: Kick::new(),
            master: SoftClip::new(0.0),
            rng,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        let start = self.now + (SCHEDULE_AHEAD_SECS * self.sample_rate) as u64;
        match cmd {
            AudioCommand::PlayNote { part, note } => {
                let detune = self.rng.gen_range(-DETUNE..DETUNE);
                if let Some(v) = self.voices.get_mut(part) {
                    v.synth.play(note, start, detune, self.sample_rate);
                }
            }
            AudioCommand::PlayPercussion => self.kick.play(start, self.sample_rate),
            AudioCommand::SetParameter { part, param, target, smoothing } => {
                if let Some(v) = self.voices.get_mut(part) {
                    match param {
                        SmoothedParam::DelayFeedback => v.delay.feedback.set_target_at_time(
                            target as f32,
                            self.now,
                            smoothing as f32,
                            self.sample_rate,
                        ),
                    }
                }
            }
        }
    }

    fn next_frame(&mut self) -> StereoFrame {
        let now = self.now;
        let sr = self.sample_rate;
        let mut out = StereoFrame::zero();
        for v in &mut self.voices {
            let dry = v.synth.next(now, sr);
            let wet = v.delay.process(dry, now);
            out += v.panner.process(dry + wet);
        }
        let kick = self.kick.next(now, sr);
        out += StereoFrame { left: kick, right: kick };
        self.now += 1;
        out
    }

    pub fn render_block(&mut self, frames: &mut [StereoFrame]) {
        for frame in frames.iter_mut() {
            *frame = self.next_frame();
        }
        self.master.process(frames);
    }
}
