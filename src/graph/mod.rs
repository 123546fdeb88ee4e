//! The audio host: the engine voices are built from.
//!
//! `AudioHost` is the seam between voice logic and sound production. The
//! software implementation renders a node graph of oscillators and gains
//! whose parameters follow time-stamped automation, so envelope shapes are
//! scheduled ahead of time on the audio clock instead of being computed in
//! the control path.

/// The `AudioHost` trait and host running state.
pub mod host;
/// Node handles and node kinds.
pub mod node;
/// Time-stamped parameter automation with exponential ramps.
pub mod param;
/// `SoftwareHost` behind a mutex for use from an audio callback.
pub mod shared;
/// Block-based software renderer for the node graph.
pub mod software;

pub use host::{AudioHost, HostState};
pub use node::NodeId;
pub use param::AudioParam;
pub use shared::{SharedHost, StreamControl};
pub use software::SoftwareHost;
