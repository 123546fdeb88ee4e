#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;

pub const MIN_OCTAVE_SHIFT: i8 = -2;
pub const MAX_OCTAVE_SHIFT: i8 = 2;

/// Settings shared by every new voice.
///
/// Passed by reference into each voice start and read only then; changing
/// the waveform or octave never touches voices that are already sounding.
/// Volume is applied through the master bus and so is the exception.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthSettings {
    volume: f32,
    waveform: Waveform,
    octave_shift: i8,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            waveform: Waveform::Sine,
            octave_shift: 0,
        }
    }
}

impl SynthSettings {
    /// Build settings, clamping out-of-range values.
    pub fn new(volume: f32, waveform: Waveform, octave_shift: i8) -> Self {
        let mut settings = Self {
            waveform,
            ..Self::default()
        };
        settings.set_volume(volume);
        settings.set_octave_shift(octave_shift);
        settings
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn octave_shift(&self) -> i8 {
        self.octave_shift
    }

    /// Set the volume, clamped to [0, 1]. NaN becomes silence.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        self.volume
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn cycle_waveform(&mut self) -> Waveform {
        self.waveform = self.waveform.next();
        self.waveform
    }

    /// Set the transpose in octaves, clamped to [-2, 2].
    pub fn set_octave_shift(&mut self, shift: i8) -> i8 {
        self.octave_shift = shift.clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
        self.octave_shift
    }

    pub fn octave_up(&mut self) -> i8 {
        self.set_octave_shift(self.octave_shift.saturating_add(1))
    }

    pub fn octave_down(&mut self) -> i8 {
        self.set_octave_shift(self.octave_shift.saturating_sub(1))
    }
}

pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
