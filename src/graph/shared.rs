//! A software host shared between the control thread and an audio callback.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::{
    dsp::oscillator::Waveform,
    graph::{
        host::{AudioHost, HostState},
        node::NodeId,
        software::SoftwareHost,
    },
};

/// Play/pause control over the physical output stream behind a host.
///
/// Suspending the host pauses the stream so the device stops pulling
/// buffers; resuming plays it again.
pub trait StreamControl {
    fn play(&self) -> Result<(), String>;
    fn pause(&self) -> Result<(), String>;
}

/// No physical stream (headless rendering, tests).
impl StreamControl for () {
    fn play(&self) -> Result<(), String> {
        Ok(())
    }

    fn pause(&self) -> Result<(), String> {
        Ok(())
    }
}

/// `SoftwareHost` behind a mutex, plus the stream it feeds.
///
/// Clone `engine()` into the audio callback and call `render` there; drive
/// the piano through the `AudioHost` impl on the control thread.
pub struct SharedHost<S = ()> {
    engine: Arc<Mutex<SoftwareHost>>,
    stream: S,
}

impl SharedHost<()> {
    pub fn new(host: SoftwareHost) -> Self {
        Self::with_stream(Arc::new(Mutex::new(host)), ())
    }
}

impl<S: StreamControl> SharedHost<S> {
    pub fn with_stream(engine: Arc<Mutex<SoftwareHost>>, stream: S) -> Self {
        Self { engine, stream }
    }

    pub fn engine(&self) -> Arc<Mutex<SoftwareHost>> {
        Arc::clone(&self.engine)
    }
}

impl<S: StreamControl> AudioHost for SharedHost<S> {
    fn current_time(&self) -> f64 {
        self.engine.lock().current_time()
    }

    fn state(&self) -> HostState {
        self.engine.lock().state()
    }

    fn resume(&mut self) {
        self.engine.lock().resume();
        if let Err(err) = self.stream.play() {
            warn!(error = %err, "failed to resume output stream");
        }
    }

    fn suspend(&mut self) {
        self.engine.lock().suspend();
        if let Err(err) = self.stream.pause() {
            warn!(error = %err, "failed to pause output stream");
        }
    }

    fn destination(&self) -> NodeId {
        self.engine.lock().destination()
    }

    fn create_oscillator(&mut self, waveform: Waveform, frequency: f64) -> NodeId {
        self.engine.lock().create_oscillator(waveform, frequency)
    }

    fn create_gain(&mut self, value: f32) -> NodeId {
        self.engine.lock().create_gain(value)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        self.engine.lock().connect(from, to)
    }

    fn disconnect(&mut self, node: NodeId) {
        self.engine.lock().disconnect(node)
    }

    fn start_oscillator(&mut self, oscillator: NodeId, when: f64) {
        self.engine.lock().start_oscillator(oscillator, when)
    }

    fn stop_oscillator(&mut self, oscillator: NodeId, when: f64) {
        self.engine.lock().stop_oscillator(oscillator, when)
    }

    fn set_gain_at(&mut self, gain: NodeId, value: f32, time: f64) {
        self.engine.lock().set_gain_at(gain, value, time)
    }

    fn exponential_ramp_gain_to(&mut self, gain: NodeId, value: f32, time: f64) {
        self.engine.lock().exponential_ramp_gain_to(gain, value, time)
    }

    fn cancel_gain_from(&mut self, gain: NodeId, time: f64) {
        self.engine.lock().cancel_gain_from(gain, time)
    }

    fn gain_at(&self, gain: NodeId, time: f64) -> Option<f32> {
        self.engine.lock().gain_at(gain, time)
    }

    /// Holds the lock for the whole of `f`, so the audio callback waits
    /// rather than rendering a half-written envelope.
    fn with_locked<R>(&mut self, f: impl FnOnce(&mut dyn AudioHost) -> R) -> R {
        let mut engine = self.engine.lock();
        f(&mut *engine)
    }
}
