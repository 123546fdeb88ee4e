//! Benchmarks for gain automation lookups.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_keys::graph::AudioParam;

use crate::BLOCK_SIZES;

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");
    let sample_rate = 48_000.0;

    // A full note curve: onset, decay to sustain, release
    let mut param = AudioParam::new(0.0001);
    param.set_value_at_time(0.0001, 0.0);
    param.exponential_ramp_to_value_at_time(1.0, 0.01);
    param.exponential_ramp_to_value_at_time(0.6, 0.13);
    param.set_value_at_time(0.6, 0.5);
    param.exponential_ramp_to_value_at_time(0.0001, 0.8);

    for &size in BLOCK_SIZES {
        // Evaluate inside the decay ramp, the costliest segment
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for i in 0..size {
                    acc += param.value_at(black_box(0.02 + i as f64 / sample_rate));
                }
                acc
            })
        });
    }

    group.finish();
}
