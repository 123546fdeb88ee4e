use std::fmt;

use crate::graph::node::NodeId;

/// Identifies a voice by the input that owns it.
///
/// A key on the computer keyboard and a mouse press on the same piano key
/// are different voices; releasing one never silences the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceId {
    /// Held by a computer-keyboard key (lowercase character).
    Keyboard(char),
    /// Held by the pointer on the piano key at this index.
    Pointer(usize),
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceId::Keyboard(key) => write!(f, "kbd_{key}"),
            VoiceId::Pointer(index) => write!(f, "mouse_{index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Held,      // Sounding, envelope in attack/decay/sustain
    Releasing, // Stop requested, waiting for cleanup
}

/// One sounding note: an oscillator feeding its own gain node.
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: VoiceId,
    pub oscillator: NodeId,
    pub gain: NodeId,
    /// MIDI number actually sounding (octave shift applied).
    pub midi: u8,
    pub frequency: f64,
    /// Piano key this voice lights up.
    pub note_index: usize,
    /// Audio-clock time of the onset.
    pub start_time: f64,
    pub release_duration: f64,
    /// Distinguishes this instance from earlier voices with the same id.
    pub generation: u64,
    pub state: VoiceState,
}

impl Voice {
    pub fn is_held(&self) -> bool {
        self.state == VoiceState::Held
    }
}
