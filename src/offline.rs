// Headless rendering: the same composition and synth as the live app, but
// clocked by sample count and written to a WAV file instead of a device.
// Blocks are cut short at each tick so every step starts on the first
// sample at or after its due time.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::audio::{Engine, StereoFrame};
use crate::middle::Middle;

pub const SAMPLE_RATE: u32 = 44_100;
const BLOCK_FRAMES: usize = 256;

/// Frames to render before the next tick is due, at least one.
fn frames_until(due: Duration, sample_rate: u32) -> usize {
    // tolerate float drift in the accumulated clock
    let frames = due.as_secs_f64() * sample_rate as f64 - 1e-6;
    (frames.ceil() as usize).max(1)
}

pub fn render_to_wav(middle: &mut Middle, engine: &mut Engine, seconds: f64, path: &Path) -> anyhow::Result<u64> {
    let sample_rate = engine.sample_rate() as u32;
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;

    let total_frames = (seconds * sample_rate as f64).round() as usize;
    let mut block = vec![StereoFrame::zero(); BLOCK_FRAMES];
    let mut written = 0;
    let mut elapsed = 0.0;

    while written < total_frames {
        for cmd in middle.tick(elapsed) {
            engine.handle_cmd(cmd);
        }
        let n = BLOCK_FRAMES
            .min(total_frames - written)
            .min(frames_until(middle.until_next_tick(), sample_rate));
        engine.render_block(&mut block[..n]);
        for f in &block[..n] {
            writer.write_sample(to_i16(f.left))?;
            writer.write_sample(to_i16(f.right))?;
        }
        written += n;
        elapsed = n as f64 / sample_rate as f64;
    }
    writer.finalize().context("finalizing wav")?;

    let ticks = middle.display_state().tick;
    info!(path = %path.display(), seconds, ticks, "rendered");
    Ok(ticks)
}

fn to_i16(x: f32) -> i16 {
    (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
