use std::f32::consts::{FRAC_PI_2, PI};

use super::frame::StereoFrame;
use super::param::AutomatedParam;

// Block effects run over the mixed stereo bus after all voices are summed.
pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
}

/// tanh saturation on the master bus. Near-transparent at normal levels,
/// keeps kick + three delays from hard-clipping the device.
pub struct SoftClip {
    drive: f32,
}

impl SoftClip {
    pub fn new(drive: f32) -> Self {
        Self { drive: drive.clamp(0.0, 1.0) }
    }
}

impl Effect for SoftClip {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        let pre_gain = 1.0 + self.drive * 10.0;
        for f in buf.iter_mut() {
            f.left = (pre_gain * f.left).tanh() / pre_gain;
            f.right = (pre_gain * f.right).tanh() / pre_gain;
        }
    }
}

/// Resonant lowpass, RBJ cookbook biquad. `q_db` is resonance in decibels,
/// the way browser audio graphs specify it.
#[derive(Clone, Debug)]
pub struct LowpassFilter {
    q: f32,
    cutoff: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowpassFilter {
    pub fn new(cutoff: f32, q_db: f32, sample_rate: f32) -> Self {
        let mut f = Self {
            q: 10f32.powf(q_db / 20.0),
            cutoff: -1.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        f.set_cutoff(cutoff, sample_rate);
        f
    }

    pub fn set_cutoff(&mut self, cutoff: f32, sample_rate: f32) {
        let cutoff = cutoff.clamp(10.0, sample_rate * 0.45);
        if (cutoff - self.cutoff).abs() < 0.01 {
            return;
        }
        self.cutoff = cutoff;

        let w0 = 2.0 * PI * cutoff / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * self.q);
        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos) / 2.0 / a0;
        self.b1 = (1.0 - cos) / a0;
        self.b2 = self.b0;
        self.a1 = -2.0 * cos / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Delay line whose output is fed back into its own input through a gain
/// stage. The gain stage's output is what the rest of the graph hears.
pub struct FeedbackDelay {
    buffer: Vec<f32>, // sized once at construction
    write: usize,
    pub feedback: AutomatedParam,
}

impl FeedbackDelay {
    pub fn new(delay_secs: f32, feedback: f32, sample_rate: f32) -> Self {
        let len = ((delay_secs * sample_rate).round() as usize).max(1);
        Self {
            buffer: vec![0.0; len],
            write: 0,
            feedback: AutomatedParam::new(feedback),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, now: u64) -> f32 {
        let delayed = self.buffer[self.write];
        let out = delayed * self.feedback.next(now);
        self.buffer[self.write] = input + out;
        self.write = (self.write + 1) % self.buffer.len();
        out
    }
}

/// Equal-power mono-to-stereo panner; `pan` runs from -1 (left) to 1 (right).
#[derive(Clone, Copy, Debug)]
pub struct Panner {
    left_gain: f32,
    right_gain: f32,
}

impl Panner {
    pub fn new(pan: f32) -> Self {
        let x = (pan.clamp(-1.0, 1.0) + 1.0) / 2.0;
        Self {
            left_gain: (x * FRAC_PI_2).cos(),
            right_gain: (x * FRAC_PI_2).sin(),
        }
    }

    #[inline]
    pub fn process(&self, input: f32) -> StereoFrame {
        StereoFrame { left: input * self.left_gain, right: input * self.right_gain }
    }
}
