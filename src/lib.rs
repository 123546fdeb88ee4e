pub mod dsp; // Oscillator waveforms
pub mod engine; // Deferred host creation
pub mod error;
pub mod graph; // Audio host and node graph
pub mod io; // Pitch conversion
pub mod keys; // Pitch table and input routing
pub mod runtime;
pub mod synth; // Voices, envelopes, master bus

pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
