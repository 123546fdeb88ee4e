/// A4 tuning reference.
pub const A4_FREQUENCY: f64 = 440.0;
/// MIDI note number of A4.
pub const A4_MIDI: f64 = 69.0;

/// Convert a MIDI note number to frequency in Hz.
///
/// Equal temperament referenced to A4 = 440 Hz: `f = 440 * 2^((midi - 69) / 12)`.
/// Fractional note numbers are valid (microtonal pitches).
pub fn midi_to_frequency(midi: f64) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((midi - A4_MIDI) / 12.0)
}

/// Shift a MIDI note by whole octaves, clamped to the MIDI range.
pub fn transpose_octaves(note: u8, octaves: i8) -> u8 {
    (i16::from(note) + 12 * i16::from(octaves)).clamp(0, 127) as u8
}
