use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::rng::{weighted_choice, RandomSource};

pub const SEMITONES_PER_OCTAVE: u8 = 12;

/// Key names, indexed from A (key 0 = A).
pub const NOTE_NAMES: [&str; 12] = ["A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"];

/// Octave offsets a fresh note may take.
const OCTAVES: [u8; 2] = [0, SEMITONES_PER_OCTAVE];

pub fn key_name(key: u8) -> &'static str {
    NOTE_NAMES[(key % SEMITONES_PER_OCTAVE) as usize]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalePreset {
    MajPent,
    Maj,
    MinPent,
    MinSix,
}

impl ScalePreset {
    pub fn degrees(self) -> &'static [u8] {
        match self {
            ScalePreset::MajPent => &[0, 2, 4, 7, 9],
            ScalePreset::Maj => &[0, 2, 4, 5, 7, 9, 11],
            ScalePreset::MinPent => &[0, 2, 3, 7, 10],
            ScalePreset::MinSix => &[0, 2, 3, 5, 7, 10],
        }
    }
}

/// How a part's scale is written in the config: a preset name or an
/// explicit list of semitone offsets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    Preset(ScalePreset),
    Degrees(Vec<u8>),
}

impl ScaleSpec {
    pub fn build(&self) -> ConfigResult<Scale> {
        match self {
            ScaleSpec::Preset(p) => Scale::new(p.degrees().to_vec()),
            ScaleSpec::Degrees(d) => Scale::new(d.clone()),
        }
    }
}

/// Non-empty set of semitone offsets within one octave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scale {
    degrees: Vec<u8>,
}

impl Scale {
    pub fn new(degrees: Vec<u8>) -> ConfigResult<Self> {
        if degrees.is_empty() {
            return Err(ConfigError::EmptyScale);
        }
        if let Some(&degree) = degrees.iter().find(|&&d| d >= SEMITONES_PER_OCTAVE) {
            return Err(ConfigError::DegreeOutOfRange { degree });
        }
        Ok(Self { degrees })
    }

    #[cfg(test)]
    pub fn degrees(&self) -> &[u8] {
        &self.degrees
    }

    /// A scale degree, optionally raised an octave. Both picks are uniform.
    pub fn random_note(&self, rng: &mut dyn RandomSource) -> u8 {
        let degree = weighted_choice(&self.degrees, 1.0, rng).copied().unwrap_or(0);
        let octave = weighted_choice(&OCTAVES, 1.0, rng).copied().unwrap_or(0);
        degree + octave
    }

    /// Whether `note` is a scale degree plus 0 or 12.
    #[cfg(test)]
    pub fn contains_note(&self, note: u8) -> bool {
        self.degrees.iter().any(|&d| note == d || note == d + SEMITONES_PER_OCTAVE)
    }
}
