//! Error types.
//!
//! Very little in this crate can fail: voice and input operations are
//! idempotent no-ops on unknown ids. What remains is the audio host being
//! unavailable and parsing configuration values.

/// Errors surfaced by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The audio host could not be created (no device, unsupported config, ...).
    /// The piano stays usable but silent.
    #[error("audio engine unavailable: {0}")]
    AudioUnavailable(String),

    /// A waveform name that is not one of `sine`, `sawtooth`, `triangle`.
    #[error("unknown waveform `{0}` (expected sine, sawtooth or triangle)")]
    UnknownWaveform(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
