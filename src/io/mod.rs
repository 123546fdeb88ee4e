// Purpose - pitch and format conversions

pub mod converter;

pub use converter::{midi_to_frequency, transpose_octaves};
