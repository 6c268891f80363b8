// The middle layer owns the composition and the clock. The main loop feeds it
// input events and elapsed time; it hands back audio commands for the synth
// and keeps the latest snapshot for the TUI to draw.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio_api::AudioCommand;
use crate::compose::{Composition, ConfigResult, SeededSource, Toggle};
use crate::pipeline::config::Config;
use crate::shared::{seconds_per_step, CompositionSnapshot, InputEvent};

/// After a stall, play at most this many overdue steps back to back and
/// drop the rest.
const MAX_CATCH_UP: u32 = 4;

pub struct Middle {
    composition: Composition<SeededSource>,
    step_secs: f64,
    until_next: f64, // seconds until the next tick is due; <= 0 means overdue
    snapshot: CompositionSnapshot,
}

impl Middle {
    pub fn new(config: &Config) -> ConfigResult<Self> {
        let rng = match config.seed {
            Some(seed) => SeededSource::from_seed(seed),
            None => SeededSource::from_entropy(),
        };
        let composition = Composition::new(config, rng)?;
        info!(
            bpm = config.bpm,
            parts = composition.parts().len(),
            key = composition.global_key(),
            "composition ready"
        );
        Ok(Self {
            composition,
            step_secs: seconds_per_step(config.bpm),
            until_next: 0.0,
            snapshot: CompositionSnapshot::default(),
        })
    }

    pub fn seconds_per_step(&self) -> f64 {
        self.step_secs
    }

    pub fn display_state(&self) -> &CompositionSnapshot {
        &self.snapshot
    }

    /// How long the main loop may sleep before the next step is due.
    pub fn until_next_tick(&self) -> Duration {
        Duration::from_secs_f64(self.until_next.max(0.0))
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let which = match event {
            InputEvent::TogglePercussion => Toggle::Percussion,
            InputEvent::ToggleVisualEffect => Toggle::VisualEffect,
            InputEvent::Quit => return,
        };
        let value = !self.composition.toggle(which);
        self.composition.set_toggle(which, value);
        debug!(?which, value, "toggle");
    }

    /// Advances the clock by `elapsed` seconds and runs every step that
    /// became due.
    pub fn tick(&mut self, elapsed: f64) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        self.until_next -= elapsed;

        let mut played = 0;
        while self.until_next <= 0.0 && played < MAX_CATCH_UP {
            self.snapshot = self.composition.tick(&mut cmds);
            self.until_next += self.step_secs;
            played += 1;
        }
        if self.until_next <= 0.0 {
            let skipped = (-self.until_next / self.step_secs).ceil();
            warn!(skipped, "clock fell behind, skipping steps");
            self.until_next = self.step_secs;
        }
        cmds
    }
}
