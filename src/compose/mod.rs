// The generative engine: everything that decides what to play.
//
// Nothing in here knows about audio devices, terminals or wall-clock time.
// `Composition::tick` is driven from outside (see middle.rs) and talks to
// the synth only through `SoundRenderer`.

mod composition;
mod error;
mod part;
mod pattern;
mod rng;
mod scale;
mod walk;

pub use composition::{Composition, Toggle};
pub use error::{ConfigError, ConfigResult};
pub use pattern::DEFAULT_LENGTHS;
pub use rng::SeededSource;
pub use scale::{ScalePreset, ScaleSpec};
pub use walk::WalkConfig;
