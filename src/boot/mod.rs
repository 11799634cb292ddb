//! Boot-mode control for the attached microcontroller.

pub mod sequencer;

pub use sequencer::{ModeSequencer, SequencerError};
