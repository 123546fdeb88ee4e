//! Low-level DSP primitives used by the software audio host.
//!
//! These components are allocation-free and realtime-safe. They stay focused
//! on the signal math; scheduling and routing live in the `graph` layer.

/// Oscillator waveforms and the phase accumulator that drives them.
pub mod oscillator;

pub use oscillator::{OscillatorBlock, Waveform};
