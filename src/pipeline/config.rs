// Startup configuration. Every field has a default, so an empty JSON object
// (or no file at all) gives the reference setup: two minor-pentatonic leads
// panned apart over a one-note bass, at 111 bpm.

use serde::{Deserialize, Serialize};

use crate::audio_api::Waveform;
use crate::compose::{ConfigError, ConfigResult, ScalePreset, ScaleSpec, WalkConfig, DEFAULT_LENGTHS};
use crate::shared::DEFAULT_BPM;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub bpm: f64,
    pub seed: Option<u64>,       // None = fresh entropy every run
    pub initial_key: Option<u8>, // None = random key
    pub mode_label: String,      // shown after the key name
    pub percussion: bool,
    pub visual_effect: bool,
    pub parts: Vec<PartConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            seed: None,
            initial_key: None,
            mode_label: String::from("minor"),
            percussion: false,
            visual_effect: false,
            parts: vec![
                PartConfig { name: "left".into(), pan: -0.6, ..PartConfig::default() },
                PartConfig { name: "right".into(), pan: 0.6, ..PartConfig::default() },
                PartConfig {
                    name: "bass".into(),
                    base_frequency: 55.0,
                    scale: ScaleSpec::Degrees(vec![0]),
                    ..PartConfig::default()
                },
            ],
        }
    }
}

impl Config {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            return Err(ConfigError::InvalidBpm(self.bpm));
        }
        if let Some(key) = self.initial_key {
            if key >= 12 {
                return Err(ConfigError::InvalidKey(key));
            }
        }
        if self.parts.is_empty() {
            return Err(ConfigError::NoParts);
        }
        self.parts.iter().try_for_each(PartConfig::validate)
    }
}

/// One voice: what it plays (scale, walks, pattern lengths) and how it is
/// voiced by the synth (wave, pan, decay).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartConfig {
    pub name: String,
    pub base_frequency: f64, // Hz at semitone 0, key A
    pub scale: ScaleSpec,
    pub wave: Waveform,
    pub pan: f64,   // -1 (left) to 1 (right)
    pub decay: f64, // seconds
    pub filter_walk: Option<WalkConfig>,
    pub feedback_walk: Option<WalkConfig>,
    pub pattern_lengths: Vec<usize>,
}

impl Default for PartConfig {
    fn default() -> Self {
        Self {
            name: String::from("lead"),
            base_frequency: 110.0,
            scale: ScaleSpec::Preset(ScalePreset::MinPent),
            wave: Waveform::Sawtooth,
            pan: 0.0,
            decay: 0.2,
            filter_walk: Some(WalkConfig::filter_exponent()),
            feedback_walk: Some(WalkConfig::delay_feedback()),
            pattern_lengths: DEFAULT_LENGTHS.to_vec(),
        }
    }
}

impl PartConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(ConfigError::InvalidBaseFrequency {
                name: self.name.clone(),
                frequency: self.base_frequency,
            });
        }
        if !(self.decay.is_finite() && self.decay >= 0.0) {
            return Err(ConfigError::InvalidDecay { name: self.name.clone(), decay: self.decay });
        }
        if self.pattern_lengths.is_empty() || self.pattern_lengths.contains(&0) {
            return Err(ConfigError::InvalidPatternLengths);
        }
        self.scale.build()?;
        for walk in self.filter_walk.iter().chain(self.feedback_walk.iter()) {
            walk.validate()?;
        }
        Ok(())
    }
}
