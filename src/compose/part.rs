use tracing::debug;

use crate::audio_api::{NoteRequest, SmoothedParam, SoundRenderer};
use crate::pipeline::config::PartConfig;
use crate::shared::StepRecord;

use super::error::ConfigResult;
use super::pattern::Pattern;
use super::rng::RandomSource;
use super::walk::BoundedWalk;

/// Equal temperament: one semitone.
pub const SEMITONE_FACTOR: f64 = 1.059_463_094_359_295_3; // 2^(1/12)

/// Cutoff used when a part has no filter walk (the synth's resting cutoff).
pub const DEFAULT_FILTER_HZ: f64 = 440.0;
/// Feedback assumed when a part has no feedback walk.
pub const DEFAULT_FEEDBACK: f64 = 0.5;
pub const FEEDBACK_SMOOTHING_SECS: f64 = 0.04;
/// The pattern mutates on every 4th step of its own part.
pub const MUTATE_EVERY: u64 = 4;

pub fn note_frequency(base_frequency: f64, semitones: i32) -> f64 {
    base_frequency * SEMITONE_FACTOR.powi(semitones)
}

/// One melodic voice: a pattern, the walks that colour it, and its own
/// step counter.
#[derive(Clone, Debug)]
pub struct Part {
    index: usize,
    name: String,
    base_frequency: f64,
    decay: f64,
    pattern: Pattern,
    filter_walk: Option<BoundedWalk>,
    feedback_walk: Option<BoundedWalk>,
    step_number: u64,
}

impl Part {
    /// `index` identifies this part's voice in the sound renderer.
    pub fn new(index: usize, config: &PartConfig, rng: &mut dyn RandomSource) -> ConfigResult<Self> {
        config.validate()?;
        let scale = config.scale.build()?;
        let pattern = Pattern::new(scale, config.pattern_lengths.clone(), rng)?;
        let filter_walk = config.filter_walk.map(|w| BoundedWalk::new(w, rng)).transpose()?;
        let feedback_walk = config.feedback_walk.map(|w| BoundedWalk::new(w, rng)).transpose()?;

        Ok(Self {
            index,
            name: config.name.clone(),
            base_frequency: config.base_frequency,
            decay: config.decay,
            pattern,
            filter_walk,
            feedback_walk,
            step_number: 0,
        })
    }

    #[cfg(test)]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[cfg(test)]
    pub fn step_number(&self) -> u64 {
        self.step_number
    }

    /// Plays the next step of the pattern in `global_key`.
    pub fn advance_step(
        &mut self,
        global_key: u8,
        rng: &mut dyn RandomSource,
        renderer: &mut dyn SoundRenderer,
    ) -> StepRecord {
        self.step_number += 1;

        let note = self.pattern.note_at(self.step_number);
        let frequency = note_frequency(self.base_frequency, note as i32 + global_key as i32);
        let filter_frequency = match self.filter_walk.as_mut() {
            Some(walk) => walk.advance(rng).exp(),
            None => DEFAULT_FILTER_HZ,
        };

        renderer.play_note(
            self.index,
            NoteRequest { frequency, filter_frequency, decay: self.decay },
        );

        if self.step_number % MUTATE_EVERY == 0 {
            let mutation = self.pattern.mutate(rng);
            debug!(part = %self.name, ?mutation, len = self.pattern.len(), "pattern mutated");
        }

        let feedback = match self.feedback_walk.as_mut() {
            Some(walk) => {
                let target = walk.advance(rng);
                renderer.set_smoothed_parameter(
                    self.index,
                    SmoothedParam::DelayFeedback,
                    target,
                    FEEDBACK_SMOOTHING_SECS,
                );
                target
            }
            None => DEFAULT_FEEDBACK,
        };

        let filter_value = match &self.filter_walk {
            Some(walk) => walk.current_value().exp().floor() as i64,
            None => DEFAULT_FILTER_HZ as i64,
        };

        StepRecord {
            step_index: (self.step_number % self.pattern.len() as u64) as usize,
            filter_value,
            feedback_percent: (feedback * 100.0).floor() as i64,
            sequence: self.pattern.sequence().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::AudioCommand;
    use crate::compose::rng::{ScriptedSource, SeededSource};
    use crate::compose::scale::{ScalePreset, ScaleSpec};
    use crate::compose::walk::WalkConfig;
    use crate::compose::ConfigError;

    fn lead() -> PartConfig {
        PartConfig {
            base_frequency: 110.0,
            scale: ScaleSpec::Preset(ScalePreset::MinPent),
            ..PartConfig::default()
        }
    }

    fn played_notes(commands: &[AudioCommand]) -> Vec<NoteRequest> {
        commands
            .iter()
            .filter_map(|c| match c {
                AudioCommand::PlayNote { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_step_plays_first_generated_note() {
        let mut rng = SeededSource::from_seed(2024);
        let mut part = Part::new(0, &lead(), &mut rng).unwrap();
        let expected_note = part.pattern().note_at(1);
        assert!([0, 2, 3, 7, 10, 12, 14, 15, 19, 22].contains(&expected_note));

        let mut out: Vec<AudioCommand> = Vec::new();
        part.advance_step(0, &mut rng, &mut out);

        let notes = played_notes(&out);
        assert_eq!(notes.len(), 1);
        let want = 110.0 * 2f64.powf(expected_note as f64 / 12.0);
        assert!((notes[0].frequency - want).abs() < 1e-9, "{} vs {want}", notes[0].frequency);
        assert_eq!(notes[0].decay, 0.2);
    }

    #[test]
    fn first_note_of_a_fresh_part_is_the_first_sequence_element() {
        // length 3 (draw 0.0), notes from (degree, octave) draws; step 1 reads index 1
        // of a 3-note sequence, so seed the first two notes identically
        let mut rng = ScriptedSource::new([0.0, 0.5, 0.9, 0.5, 0.9, 0.5, 0.9]);
        let config = PartConfig { filter_walk: None, feedback_walk: None, ..lead() };
        let mut part = Part::new(0, &config, &mut rng).unwrap();
        assert_eq!(part.pattern().sequence(), &[15, 15, 15]);

        let mut out: Vec<AudioCommand> = Vec::new();
        let record = part.advance_step(0, &mut rng, &mut out);
        let notes = played_notes(&out);
        assert!((notes[0].frequency - 110.0 * 2f64.powf(15.0 / 12.0)).abs() < 1e-9);
        assert_eq!(notes[0].filter_frequency, DEFAULT_FILTER_HZ);
        assert_eq!(record.filter_value, 440);
        assert_eq!(record.feedback_percent, 50);
        assert_eq!(record.step_index, 1);
    }

    #[test]
    fn global_key_transposes() {
        let mut rng = ScriptedSource::new([0.0, 0.0, 0.0]);
        let config = PartConfig { filter_walk: None, feedback_walk: None, ..lead() };
        let mut part = Part::new(0, &config, &mut rng).unwrap();
        assert_eq!(part.pattern().sequence(), &[0, 0, 0]);

        let mut out: Vec<AudioCommand> = Vec::new();
        part.advance_step(7, &mut rng, &mut out);
        let notes = played_notes(&out);
        assert!((notes[0].frequency - 110.0 * 2f64.powf(7.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn feedback_walk_sends_smoothed_update() {
        let mut rng = SeededSource::from_seed(3);
        let config = PartConfig { filter_walk: None, ..lead() };
        let mut part = Part::new(2, &config, &mut rng).unwrap();

        let mut out: Vec<AudioCommand> = Vec::new();
        let record = part.advance_step(0, &mut rng, &mut out);
        assert_eq!(out.len(), 2);
        match out[1] {
            AudioCommand::SetParameter { part, param, target, smoothing } => {
                assert_eq!(part, 2);
                assert_eq!(param, SmoothedParam::DelayFeedback);
                assert_eq!(smoothing, FEEDBACK_SMOOTHING_SECS);
                assert_eq!(record.feedback_percent, (target * 100.0).floor() as i64);
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn record_reports_filter_and_sequence() {
        let mut rng = SeededSource::from_seed(8);
        let mut part = Part::new(0, &lead(), &mut rng).unwrap();
        let mut out: Vec<AudioCommand> = Vec::new();
        for _ in 0..50 {
            out.clear();
            let record = part.advance_step(0, &mut rng, &mut out);
            let cutoff = played_notes(&out)[0].filter_frequency;
            assert_eq!(record.filter_value, cutoff.floor() as i64);
            assert_eq!(record.sequence, part.pattern().sequence());
            assert_eq!(record.step_index, (part.step_number() % part.pattern().len() as u64) as usize);
        }
    }

    #[test]
    fn pattern_only_mutates_on_every_fourth_step() {
        let mut rng = SeededSource::from_seed(12);
        let config = PartConfig {
            filter_walk: Some(WalkConfig::filter_exponent()),
            feedback_walk: None,
            ..lead()
        };
        let mut part = Part::new(0, &config, &mut rng).unwrap();
        let mut out: Vec<AudioCommand> = Vec::new();
        for step in 1..=40u64 {
            let before = part.pattern().sequence().to_vec();
            part.advance_step(0, &mut rng, &mut out);
            if step % MUTATE_EVERY != 0 {
                assert_eq!(part.pattern().sequence(), before.as_slice(), "step {step}");
            }
        }
    }

    #[test]
    fn rejects_non_positive_base_frequency() {
        let mut rng = ScriptedSource::new([0.1]);
        let config = PartConfig { base_frequency: 0.0, ..lead() };
        assert!(matches!(
            Part::new(0, &config, &mut rng),
            Err(ConfigError::InvalidBaseFrequency { .. })
        ));
    }
}
