use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{error, info, warn};

use crate::audio_api::AudioCommand;

mod effect;
mod engine;
mod frame;
mod param;
mod voice;

pub use engine::{Engine, Voicing};
pub use frame::StereoFrame;

const COMMAND_QUEUE: usize = 1024;
/// Largest callback we expect; the scratch buffer grows past it if needed.
const SCRATCH_FRAMES: usize = 4096;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if let Err(TrySendError::Full(cmd)) = self.tx.try_send(cmd) {
            warn!(?cmd, "audio command queue full, dropping");
        }
    }
}

pub fn start_audio(voicings: &[Voicing], seconds_per_step: f64, seed: u64) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "opening output stream");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(sample_rate, voicings, seconds_per_step, seed);
            let output_stream = build_output_stream_f32(&device, &config.into(), engine, rx, channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle { tx, _output_stream: output_stream })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: Engine,
    rx: Receiver<AudioCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| error!("audio output stream error: {err}");
    let mut scratch = vec![StereoFrame::zero(); SCRATCH_FRAMES];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if scratch.len() < n_frames {
                scratch.resize(n_frames, StereoFrame::zero());
            }
            let frames = &mut scratch[..n_frames];
            engine.render_block(frames);

            // mono devices get the average, extra channels stay silent
            for (out, f) in data.chunks_exact_mut(channels.max(1)).zip(frames.iter()) {
                match out {
                    [mono] => *mono = 0.5 * (f.left + f.right),
                    [l, r, rest @ ..] => {
                        *l = f.left;
                        *r = f.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
