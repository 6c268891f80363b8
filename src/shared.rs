// Types that cross layer boundaries: what the input layer reports and what
// the display layer draws.
//
// Keys:
//   k             //  TogglePercussion (kick on every beat)
//   m             //  ToggleVisualEffect (random colour blocks)
//   Esc / q       //  Quit
//
// The display never looks at engine state directly. Each tick produces an
// owned `CompositionSnapshot`; the TUI keeps redrawing the latest one at its
// own frame rate until the next tick replaces it.

pub const DEFAULT_BPM: f64 = 111.0;
pub const STEPS_PER_BEAT: f64 = 4.0;
/// Display refresh, independent of the tick rate.
pub const FRAME_INTERVAL_MS: u64 = 1000 / 30;

pub fn seconds_per_step(bpm: f64) -> f64 {
    60.0 / (bpm * STEPS_PER_BEAT)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    TogglePercussion,
    ToggleVisualEffect,
    Quit,
}

/// What one part did on one step, rounded for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepRecord {
    pub step_index: usize,      // position within the sequence
    pub filter_value: i64,      // cutoff in whole Hz
    pub feedback_percent: i64,  // delay feedback * 100
    pub sequence: Vec<u8>,      // copy of the pattern at this step
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositionSnapshot {
    pub tick: u64,
    pub parts: Vec<StepRecord>, // same order the parts were stepped in
    pub key: u8,
    pub key_name: &'static str,
    pub percussion_enabled: bool,
    pub visual_effect_enabled: bool,
}
