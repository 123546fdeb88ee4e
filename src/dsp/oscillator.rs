use std::{f32::consts::TAU, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
Oscillator
==========

A phase accumulator drives every waveform. Each sample the phase advances
by `frequency / sample_rate` and wraps into [0, 1). The waveform is a pure
function of the phase:

  Sine       sin(2π·phase)                      fundamental only, soft
  Sawtooth   2·phase - 1                        all harmonics, bright
  Triangle   1 - 4·|phase - 0.5|                odd harmonics falling as 1/n², mellow

    phase:     0        0.25       0.5       0.75       1
    sine:      0   ↗    1     ↘    0    ↘   -1    ↗     0
    sawtooth: -1   ↗   -0.5   ↗    0    ↗   0.5   ↗     1 → wraps to -1
    triangle: -1   ↗    0     ↗    1    ↘    0    ↘    -1

The sawtooth and triangle are naive (not band-limited). At piano-range
pitches the aliasing is low enough for a practice instrument.
*/

/// The oscillator waveforms a voice can use.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 3] = [Waveform::Sine, Waveform::Sawtooth, Waveform::Triangle];

    /// The next waveform in `ALL`, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Triangle,
            Waveform::Triangle => Waveform::Sine,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Evaluate the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Waveform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            other => Err(Error::UnknownWaveform(other.to_string())),
        }
    }
}

/// Phase-accumulator oscillator with a fixed frequency.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    frequency: f64,
    phase: f64,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform, frequency: f64) -> Self {
        Self {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Produce the next sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f64) -> f32 {
        let out = self.waveform.sample(self.phase as f32);
        // f64 phase keeps long notes from drifting
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        out
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f64) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}
