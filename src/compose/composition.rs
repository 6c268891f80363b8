use std::str::FromStr;

use tracing::debug;

use crate::audio_api::SoundRenderer;
use crate::pipeline::config::Config;
use crate::shared::CompositionSnapshot;

use super::error::{ConfigError, ConfigResult};
use super::part::Part;
use super::rng::{weighted_choice, weighted_index, RandomSource};
use super::scale::{key_name, SEMITONES_PER_OCTAVE};

pub const PERCUSSION_EVERY: u64 = 4;
pub const MODULATE_EVERY: u64 = 128;
/// Candidate key shifts in semitones, "no change" first.
pub const KEY_STEPS: [u8; 5] = [0, 7, 5, 10, 2];
const KEY_STEP_POWER: f64 = 3.0;

/// The two switches the outside world may flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Percussion,
    VisualEffect,
}

impl FromStr for Toggle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percussion" => Ok(Toggle::Percussion),
            "visualEffect" => Ok(Toggle::VisualEffect),
            other => Err(ConfigError::UnknownToggle(other.to_string())),
        }
    }
}

/// All parts plus the shared key and percussion, stepped together once per
/// sixteenth note.
pub struct Composition<R: RandomSource> {
    rng: R,
    parts: Vec<Part>,
    global_key: u8,
    global_step: u64,
    percussion_enabled: bool,
    visual_effect_enabled: bool,
}

impl<R: RandomSource> Composition<R> {
    pub fn new(config: &Config, mut rng: R) -> ConfigResult<Self> {
        config.validate()?;
        let global_key = match config.initial_key {
            Some(key) => key,
            None => weighted_index(SEMITONES_PER_OCTAVE as usize, 1.0, &mut rng) as u8,
        };
        let parts = config
            .parts
            .iter()
            .enumerate()
            .map(|(i, pc)| Part::new(i, pc, &mut rng))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            rng,
            parts,
            global_key,
            global_step: 0,
            percussion_enabled: config.percussion,
            visual_effect_enabled: config.visual_effect,
        })
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn global_key(&self) -> u8 {
        self.global_key
    }

    pub fn toggle(&self, which: Toggle) -> bool {
        match which {
            Toggle::Percussion => self.percussion_enabled,
            Toggle::VisualEffect => self.visual_effect_enabled,
        }
    }

    pub fn set_toggle(&mut self, which: Toggle, value: bool) {
        match which {
            Toggle::Percussion => self.percussion_enabled = value,
            Toggle::VisualEffect => self.visual_effect_enabled = value,
        }
    }

    /// String-keyed form of [`set_toggle`](Self::set_toggle).
    pub fn set_toggle_by_name(&mut self, name: &str, value: bool) -> ConfigResult<()> {
        let which = name.parse::<Toggle>()?;
        self.set_toggle(which, value);
        Ok(())
    }

    /// Advances one sixteenth note.
    pub fn tick(&mut self, renderer: &mut dyn SoundRenderer) -> CompositionSnapshot {
        self.global_step += 1;

        if self.percussion_enabled && self.global_step % PERCUSSION_EVERY == 0 {
            renderer.play_percussion();
        }

        if self.global_step % MODULATE_EVERY == 0 {
            let shift = weighted_choice(&KEY_STEPS, KEY_STEP_POWER, &mut self.rng)
                .copied()
                .unwrap_or(0);
            let prior = self.global_key;
            self.global_key = (prior + shift) % SEMITONES_PER_OCTAVE;
            debug!(from = key_name(prior), to = key_name(self.global_key), "key change");
        }

        let key = self.global_key;
        let rng = &mut self.rng;
        let parts = self
            .parts
            .iter_mut()
            .map(|part| part.advance_step(key, &mut *rng, &mut *renderer))
            .collect();

        CompositionSnapshot {
            tick: self.global_step,
            parts,
            key: self.global_key,
            key_name: key_name(self.global_key),
            percussion_enabled: self.percussion_enabled,
            visual_effect_enabled: self.visual_effect_enabled,
        }
    }
}
