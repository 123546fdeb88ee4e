use crate::{dsp::oscillator::Waveform, graph::node::NodeId};

/// Whether the host's clock is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Running,
    Suspended,
}

/// The audio engine the piano drives.
///
/// This is the whole contract between voice logic and sound production:
/// create nodes, connect them into a chain, schedule time-stamped gain
/// values, and start/stop oscillators at future times. All times are seconds
/// on the host's own clock (`current_time`).
///
/// Operations on unknown or already-removed nodes are ignored. Nothing here
/// returns an error: voices are ephemeral and a missed disconnect is harmless.
pub trait AudioHost {
    /// Current time of the audio clock in seconds.
    fn current_time(&self) -> f64;

    fn state(&self) -> HostState;

    fn resume(&mut self);

    fn suspend(&mut self);

    /// The sink every chain ends in.
    fn destination(&self) -> NodeId;

    fn create_oscillator(&mut self, waveform: Waveform, frequency: f64) -> NodeId;

    fn create_gain(&mut self, value: f32) -> NodeId;

    /// Route `from`'s output into `to`.
    fn connect(&mut self, from: NodeId, to: NodeId);

    /// Remove `node` and all of its connections. Tolerates unknown nodes.
    fn disconnect(&mut self, node: NodeId);

    fn start_oscillator(&mut self, oscillator: NodeId, when: f64);

    fn stop_oscillator(&mut self, oscillator: NodeId, when: f64);

    fn set_gain_at(&mut self, gain: NodeId, value: f32, time: f64);

    fn exponential_ramp_gain_to(&mut self, gain: NodeId, value: f32, time: f64);

    /// Cancel every gain event scheduled at or after `time`.
    fn cancel_gain_from(&mut self, gain: NodeId, time: f64);

    /// Instantaneous gain value at `time`, `None` for unknown nodes.
    fn gain_at(&self, gain: NodeId, time: f64) -> Option<f32>;

    /// Run `f` with exclusive access to the graph: no audio is rendered
    /// between the calls it makes. A voice onset or release reads the clock
    /// and then writes several events, so it must run inside one of these.
    ///
    /// `resume` and `suspend` called from `f` only change the graph state,
    /// not any output stream behind it.
    fn with_locked<R>(&mut self, f: impl FnOnce(&mut dyn AudioHost) -> R) -> R
    where
        Self: Sized;
}
