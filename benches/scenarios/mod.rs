//! Real-world scenario benchmarks.
//!
//! These benchmarks model actual playing: chords held on the software host,
//! with every voice running its own oscillator and envelope.

mod voices;

pub use voices::bench_voices;
