use serde::{Deserialize, Serialize};

/// Oscillator shape for a part's synth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sawtooth,
    Square,
    Triangle,
    Sine,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteRequest {
    pub frequency: f64,        // Hz
    pub filter_frequency: f64, // lowpass cutoff, Hz
    pub decay: f64,            // seconds
}

/// Synth parameters that glide to a new value instead of jumping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmoothedParam {
    DelayFeedback,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    // `part` indexes the voice the engine built for that part at startup
    PlayNote { part: usize, note: NoteRequest },

    PlayPercussion,

    SetParameter { part: usize, param: SmoothedParam, target: f64, smoothing: f64 },
}

/// Everything the composition asks of whatever makes the sound.
pub trait SoundRenderer {
    fn play_note(&mut self, part: usize, note: NoteRequest);
    fn play_percussion(&mut self);
    fn set_smoothed_parameter(&mut self, part: usize, param: SmoothedParam, target: f64, smoothing: f64);
}

// Collecting into a Vec lets a tick run on the UI thread and ship its
// commands to the audio thread afterwards.
impl SoundRenderer for Vec<AudioCommand> {
    fn play_note(&mut self, part: usize, note: NoteRequest) {
        self.push(AudioCommand::PlayNote { part, note });
    }

    fn play_percussion(&mut self) {
        self.push(AudioCommand::PlayPercussion);
    }

    fn set_smoothed_parameter(&mut self, part: usize, param: SmoothedParam, target: f64, smoothing: f64) {
        self.push(AudioCommand::SetParameter { part, param, target, smoothing });
    }
}
