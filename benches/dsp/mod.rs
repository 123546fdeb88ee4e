//! Benchmarks for low-level DSP primitives.

mod oscillator;
mod param;

pub use oscillator::bench_oscillator;
pub use param::bench_param;
