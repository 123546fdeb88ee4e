//! Runtime for playing the piano from a front end.
//!
//! This module provides `Piano`, the object a UI drives with input events
//! and visibility changes.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use saavy_keys::{
//!     engine::AudioEngine,
//!     graph::SoftwareHost,
//!     runtime::Piano,
//!     synth::SynthSettings,
//! };
//!
//! let engine = AudioEngine::new(|| Ok(SoftwareHost::new(48_000.0)));
//! let mut piano = Piano::new(engine, SynthSettings::default());
//!
//! let now = Instant::now();
//! piano.key_down('a', false, now); // C4
//! assert!(piano.active_notes()[0]);
//! piano.key_up('a', now);
//! ```

mod piano;

pub use piano::{Piano, Visibility};
