use tracing::debug;

use crate::{
    graph::{host::AudioHost, node::NodeId},
    synth::settings::clamp_volume,
};

/// The shared gain stage every voice feeds into.
///
/// Volume changes are written at the current audio time, so they reach all
/// sounding voices at once.
#[derive(Debug)]
pub struct MasterBus {
    gain: NodeId,
    volume: f32,
}

impl MasterBus {
    /// Create the master gain and connect it to the host's destination.
    pub fn new<H: AudioHost + ?Sized>(host: &mut H, volume: f32) -> Self {
        let volume = clamp_volume(volume);
        let gain = host.create_gain(volume);
        let destination = host.destination();
        host.connect(gain, destination);
        Self { gain, volume }
    }

    /// Node voices should connect to.
    pub fn input(&self) -> NodeId {
        self.gain
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume<H: AudioHost + ?Sized>(&mut self, host: &mut H, volume: f32) {
        self.volume = clamp_volume(volume);
        let now = host.current_time();
        host.cancel_gain_from(self.gain, now);
        host.set_gain_at(self.gain, self.volume, now);
        debug!(volume = self.volume, "master volume");
    }
}
