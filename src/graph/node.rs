use slotmap::new_key_type;

use crate::{dsp::oscillator::OscillatorBlock, graph::param::AudioParam};

new_key_type! {
    /// Handle to a node inside an audio host.
    pub struct NodeId;
}

/// Oscillator source with a start/stop window on the audio clock.
#[derive(Debug)]
pub struct OscillatorNode {
    pub block: OscillatorBlock,
    pub start_at: Option<f64>,
    pub stop_at: Option<f64>,
}

impl OscillatorNode {
    pub fn new(block: OscillatorBlock) -> Self {
        Self {
            block,
            start_at: None,
            stop_at: None,
        }
    }

    /// True if the oscillator produces sound at `time`.
    pub fn is_sounding(&self, time: f64) -> bool {
        let started = self.start_at.is_some_and(|start| time >= start);
        started && !self.is_finished(time)
    }

    /// True once the stop time has passed; the node can never sound again.
    pub fn is_finished(&self, time: f64) -> bool {
        self.stop_at.is_some_and(|stop| time >= stop)
    }
}

/// The processing performed by a node.
#[derive(Debug)]
pub enum NodeKind {
    Oscillator(OscillatorNode),
    /// Sums its inputs and multiplies by `gain`.
    Gain { gain: AudioParam },
    /// Final sink; sums its inputs.
    Destination,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Oscillator(_) => "oscillator",
            NodeKind::Gain { .. } => "gain",
            NodeKind::Destination => "destination",
        }
    }
}
