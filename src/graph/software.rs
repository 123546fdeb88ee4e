//! Software audio host.
//!
//! A small node graph (oscillators → gains → destination) rendered block by
//! block. Nodes are evaluated in topological order so every node's inputs are
//! complete before it runs; each node owns one block-sized buffer.

use std::collections::{HashMap, VecDeque};

#[cfg(feature = "rtrb")]
use rtrb::Producer;
use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, warn};

use crate::{
    dsp::oscillator::{OscillatorBlock, Waveform},
    graph::{
        host::{AudioHost, HostState},
        node::{NodeId, NodeKind, OscillatorNode},
        param::AudioParam,
    },
    MAX_BLOCK_SIZE,
};

pub struct SoftwareHost {
    sample_rate: f64,
    /// Frames rendered while running. Defines the audio clock.
    frames: u64,
    state: HostState,
    nodes: SlotMap<NodeId, NodeKind>,
    connections: Vec<(NodeId, NodeId)>,
    execution_order: Vec<NodeId>,
    order_dirty: bool,
    buffers: SecondaryMap<NodeId, Vec<f32>>,
    destination: NodeId,
    #[cfg(feature = "rtrb")]
    tap: Option<Producer<f32>>,
}

impl SoftwareHost {
    pub fn new(sample_rate: f32) -> Self {
        let mut nodes = SlotMap::with_key();
        let destination = nodes.insert(NodeKind::Destination);
        let mut buffers = SecondaryMap::new();
        buffers.insert(destination, vec![0.0; MAX_BLOCK_SIZE]);

        Self {
            sample_rate: f64::from(sample_rate),
            frames: 0,
            state: HostState::Running,
            nodes,
            connections: Vec::new(),
            execution_order: vec![destination],
            order_dirty: false,
            buffers,
            destination,
            #[cfg(feature = "rtrb")]
            tap: None,
        }
    }

    /// Copy every rendered sample into `tap` (e.g. for an oscilloscope).
    /// Samples are dropped when the ring is full.
    #[cfg(feature = "rtrb")]
    pub fn with_tap(mut self, tap: Producer<f32>) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Number of live nodes, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn oscillator(&self, id: NodeId) -> Option<&OscillatorNode> {
        match self.nodes.get(id) {
            Some(NodeKind::Oscillator(osc)) => Some(osc),
            _ => None,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.connections.contains(&(from, to))
    }

    /// Whether signal leaving `from` can arrive at `to`.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut seen = SecondaryMap::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if seen.insert(node, ()).is_some() {
                continue;
            }
            stack.extend(
                self.connections
                    .iter()
                    .filter(|&&(src, _)| src == node)
                    .map(|&(_, dst)| dst),
            );
        }
        false
    }

    /// Render mono output into `out`, advancing the clock.
    ///
    /// While suspended this writes silence and the clock stands still.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == HostState::Suspended {
            out.fill(0.0);
            return;
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(chunk);
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        if self.order_dirty {
            self.rebuild_order();
        }

        let frames = out.len();
        let sample_rate = self.sample_rate;
        let block_start = self.frames as f64 / sample_rate;
        let time_of = |i: usize| block_start + i as f64 / sample_rate;

        // Destructure so buffers can be borrowed while nodes are mutated
        let Self {
            nodes,
            connections,
            execution_order,
            buffers,
            ..
        } = self;

        for &id in execution_order.iter() {
            let Some(mut buf) = buffers.get_mut(id).map(std::mem::take) else {
                continue;
            };
            let block = &mut buf[..frames];
            block.fill(0.0);

            match nodes.get_mut(id) {
                Some(NodeKind::Oscillator(osc)) => {
                    for (i, sample) in block.iter_mut().enumerate() {
                        if osc.is_sounding(time_of(i)) {
                            *sample = osc.block.next_sample(sample_rate);
                        }
                    }
                }
                Some(NodeKind::Gain { gain }) => {
                    mix_inputs(block, id, connections, buffers);
                    for (i, sample) in block.iter_mut().enumerate() {
                        *sample *= gain.value_at(time_of(i));
                    }
                }
                Some(NodeKind::Destination) => {
                    mix_inputs(block, id, connections, buffers);
                }
                None => {}
            }

            if let Some(slot) = buffers.get_mut(id) {
                *slot = buf;
            }
        }

        match buffers.get(self.destination) {
            Some(mixed) => {
                for (o, s) in out.iter_mut().zip(&mixed[..frames]) {
                    *o = s.clamp(-1.0, 1.0);
                }
            }
            None => out.fill(0.0),
        }

        #[cfg(feature = "rtrb")]
        if let Some(tap) = self.tap.as_mut() {
            for &sample in out.iter() {
                if tap.push(sample).is_err() {
                    break;
                }
            }
        }

        self.frames += frames as u64;

        let now = self.current_time();
        for node in self.nodes.values_mut() {
            if let NodeKind::Gain { gain } = node {
                gain.prune_before(now);
            }
        }
    }

    /// Kahn's algorithm over the live nodes.
    fn rebuild_order(&mut self) {
        let mut in_degree: HashMap<NodeId, usize> = self.nodes.keys().map(|k| (k, 0)).collect();
        let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for &(from, to) in &self.connections {
            *in_degree.entry(to).or_insert(0) += 1;
            successors.entry(from).or_default().push(to);
        }

        let mut queue: VecDeque<NodeId> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for succ in successors.get(&node).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(*succ);
                    }
                }
            }
        }

        // connect refuses cycles, so every node gets a slot
        debug_assert_eq!(order.len(), self.nodes.len());

        self.execution_order = order;
        self.order_dirty = false;
    }

    fn gain_param_mut(&mut self, id: NodeId) -> Option<&mut AudioParam> {
        match self.nodes.get_mut(id) {
            Some(NodeKind::Gain { gain }) => Some(gain),
            _ => None,
        }
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.insert(kind);
        self.buffers.insert(id, vec![0.0; MAX_BLOCK_SIZE]);
        self.order_dirty = true;
        id
    }
}

fn mix_inputs(
    block: &mut [f32],
    id: NodeId,
    connections: &[(NodeId, NodeId)],
    buffers: &SecondaryMap<NodeId, Vec<f32>>,
) {
    for &(from, _) in connections.iter().filter(|(_, to)| *to == id) {
        if let Some(input) = buffers.get(from) {
            for (o, i) in block.iter_mut().zip(input.iter()) {
                *o += i;
            }
        }
    }
}

impl AudioHost for SoftwareHost {
    fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    fn state(&self) -> HostState {
        self.state
    }

    fn resume(&mut self) {
        if self.state != HostState::Running {
            debug!(time = self.current_time(), "host resumed");
            self.state = HostState::Running;
        }
    }

    fn suspend(&mut self) {
        if self.state != HostState::Suspended {
            debug!(time = self.current_time(), "host suspended");
            self.state = HostState::Suspended;
        }
    }

    fn destination(&self) -> NodeId {
        self.destination
    }

    fn create_oscillator(&mut self, waveform: Waveform, frequency: f64) -> NodeId {
        let block = OscillatorBlock::new(waveform, frequency);
        self.insert_node(NodeKind::Oscillator(OscillatorNode::new(block)))
    }

    fn create_gain(&mut self, value: f32) -> NodeId {
        self.insert_node(NodeKind::Gain {
            gain: AudioParam::new(value),
        })
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if from == to || !self.contains(from) || !self.contains(to) {
            return;
        }
        if self.reaches(to, from) {
            warn!("refusing connection that would close a cycle");
            return;
        }
        if !self.is_connected(from, to) {
            self.connections.push((from, to));
            self.order_dirty = true;
        }
    }

    fn disconnect(&mut self, node: NodeId) {
        if node == self.destination {
            return;
        }
        if let Some(kind) = self.nodes.remove(node) {
            self.buffers.remove(node);
            self.connections.retain(|&(from, to)| from != node && to != node);
            self.order_dirty = true;
            debug!(kind = kind.label(), "node disconnected");
        }
    }

    fn start_oscillator(&mut self, oscillator: NodeId, when: f64) {
        if let Some(NodeKind::Oscillator(osc)) = self.nodes.get_mut(oscillator) {
            osc.start_at = Some(when);
        }
    }

    fn stop_oscillator(&mut self, oscillator: NodeId, when: f64) {
        if let Some(NodeKind::Oscillator(osc)) = self.nodes.get_mut(oscillator) {
            osc.stop_at = Some(when);
        }
    }

    fn set_gain_at(&mut self, gain: NodeId, value: f32, time: f64) {
        if let Some(param) = self.gain_param_mut(gain) {
            param.set_value_at_time(value, time);
        }
    }

    fn exponential_ramp_gain_to(&mut self, gain: NodeId, value: f32, time: f64) {
        if let Some(param) = self.gain_param_mut(gain) {
            param.exponential_ramp_to_value_at_time(value, time);
        }
    }

    fn cancel_gain_from(&mut self, gain: NodeId, time: f64) {
        if let Some(param) = self.gain_param_mut(gain) {
            param.cancel_scheduled_values(time);
        }
    }

    fn gain_at(&self, gain: NodeId, time: f64) -> Option<f32> {
        match self.nodes.get(gain) {
            Some(NodeKind::Gain { gain }) => Some(gain.value_at(time)),
            _ => None,
        }
    }

    /// Exclusive already: rendering needs `&mut self` too.
    fn with_locked<R>(&mut self, f: impl FnOnce(&mut dyn AudioHost) -> R) -> R {
        f(self)
    }
}
