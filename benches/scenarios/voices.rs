//! Benchmarks for the software host rendering several voices.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_keys::{
    dsp::Waveform,
    graph::SoftwareHost,
    synth::{MasterBus, SynthSettings, VoiceId, VoiceRegistry},
};

use crate::BLOCK_SIZES;

/// A host with `count` held voices rising chromatically from middle C.
fn held_chord(count: usize, waveform: Waveform) -> SoftwareHost {
    let mut host = SoftwareHost::new(48_000.0);
    let master = MasterBus::new(&mut host, 0.7);
    let settings = SynthSettings::new(0.7, waveform, 0);
    let mut registry = VoiceRegistry::default();

    for note_index in 0..count {
        registry.start(
            &mut host,
            &master,
            VoiceId::Pointer(note_index),
            60 + note_index as u8,
            note_index,
            &settings,
        );
    }
    host
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SINGLE NOTE ===
        // Baseline: one oscillator → gain → master → destination
        let mut single = held_chord(1, Waveform::Sine);
        group.bench_with_input(BenchmarkId::new("single_sine", size), &size, |b, _| {
            b.iter(|| single.render(black_box(&mut buffer)))
        });

        // === TRIAD ===
        let mut triad = held_chord(3, Waveform::Triangle);
        group.bench_with_input(BenchmarkId::new("triad_triangle", size), &size, |b, _| {
            b.iter(|| triad.render(black_box(&mut buffer)))
        });

        // === EVERY KEY ===
        // All 13 keys held at once, the most the keyboard can produce
        let mut cluster = held_chord(13, Waveform::Sawtooth);
        group.bench_with_input(BenchmarkId::new("all_keys_sawtooth", size), &size, |b, _| {
            b.iter(|| cluster.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
