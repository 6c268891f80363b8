use super::error::{ConfigError, ConfigResult};
use super::rng::{weighted_choice, weighted_index, RandomSource};
use super::scale::Scale;

pub const DEFAULT_LENGTHS: [usize; 5] = [3, 4, 5, 8, 12];

/// Bias of the mutation picker toward the gentler operators.
const MUTATION_POWER: f64 = 5.0;

/// The three ways a pattern can change, gentlest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    SwapTwo,
    RandomizeOne,
    Reshape,
}

impl Mutation {
    pub const ALL: [Mutation; 3] = [Mutation::SwapTwo, Mutation::RandomizeOne, Mutation::Reshape];
}

/// A looping note sequence over a scale that rewrites itself a little at a
/// time. Each note is a scale degree, optionally an octave up.
#[derive(Clone, Debug)]
pub struct Pattern {
    scale: Scale,
    lengths: Vec<usize>,
    sequence: Vec<u8>,
}

impl Pattern {
    pub fn new(scale: Scale, lengths: Vec<usize>, rng: &mut dyn RandomSource) -> ConfigResult<Self> {
        if lengths.is_empty() || lengths.contains(&0) {
            return Err(ConfigError::InvalidPatternLengths);
        }
        let mut pattern = Self { scale, lengths, sequence: Vec::new() };
        pattern.reshape_sequence(rng);
        Ok(pattern)
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[cfg(test)]
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn note_at(&self, step: u64) -> u8 {
        // never empty: construction reshapes to a positive length
        self.sequence[(step % self.sequence.len() as u64) as usize]
    }

    /// Picks a new length. Notes inside the kept range survive, new slots
    /// get fresh notes.
    pub fn reshape_sequence(&mut self, rng: &mut dyn RandomSource) {
        let len = weighted_choice(&self.lengths, 1.0, rng).copied().unwrap_or(DEFAULT_LENGTHS[0]);
        self.sequence.truncate(len);
        while self.sequence.len() < len {
            let note = self.scale.random_note(rng);
            self.sequence.push(note);
        }
    }

    /// Swaps two positions, possibly the same one.
    pub fn swap_two(&mut self, rng: &mut dyn RandomSource) {
        let a = weighted_index(self.sequence.len(), 1.0, rng);
        let b = weighted_index(self.sequence.len(), 1.0, rng);
        self.sequence.swap(a, b);
    }

    pub fn randomize_one(&mut self, rng: &mut dyn RandomSource) {
        let idx = weighted_index(self.sequence.len(), 1.0, rng);
        self.sequence[idx] = self.scale.random_note(rng);
    }

    pub fn mutate(&mut self, rng: &mut dyn RandomSource) -> Mutation {
        let mutation = weighted_choice(&Mutation::ALL, MUTATION_POWER, rng)
            .copied()
            .unwrap_or(Mutation::SwapTwo);
        match mutation {
            Mutation::SwapTwo => self.swap_two(rng),
            Mutation::RandomizeOne => self.randomize_one(rng),
            Mutation::Reshape => self.reshape_sequence(rng),
        }
        mutation
    }
}
