//! Input router: physical events in, voice start/stop requests out.
//!
//! Keyboard voices are held while the key is down; auto-repeat is ignored so
//! every physical press produces exactly one onset. Pointer presses are bound
//! to the key under the pointer, but the release is accepted anywhere, since
//! a player may drag off the key before letting go.

use std::collections::HashSet;

use crate::{
    keys::table::{self, KEY_COUNT, NOTES},
    synth::voice::VoiceId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: char, repeat: bool },
    KeyUp { key: char },
    /// Press over the key element at `note_index`.
    PointerDown { note_index: usize },
    /// Release anywhere.
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceAction {
    Start {
        id: VoiceId,
        midi: u8,
        note_index: usize,
    },
    Stop {
        id: VoiceId,
    },
}

#[derive(Debug, Default)]
pub struct InputRouter {
    keys_down: HashSet<char>,
    pointer: Option<usize>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one event into the voice requests it implies.
    /// Unmapped keys and unknown indices produce nothing.
    pub fn route(&mut self, event: InputEvent) -> Vec<VoiceAction> {
        match event {
            InputEvent::KeyDown { key, repeat } => {
                let key = key.to_ascii_lowercase();
                let Some(note_index) = table::index_of(key) else {
                    return Vec::new();
                };
                if repeat || !self.keys_down.insert(key) {
                    return Vec::new();
                }
                vec![VoiceAction::Start {
                    id: VoiceId::Keyboard(key),
                    midi: NOTES[note_index].midi,
                    note_index,
                }]
            }
            InputEvent::KeyUp { key } => {
                let key = key.to_ascii_lowercase();
                if table::index_of(key).is_none() {
                    return Vec::new();
                }
                self.keys_down.remove(&key);
                vec![VoiceAction::Stop {
                    id: VoiceId::Keyboard(key),
                }]
            }
            InputEvent::PointerDown { note_index } => {
                let Some(note) = table::note_at(note_index) else {
                    return Vec::new();
                };
                let mut actions = Vec::with_capacity(2);
                if let Some(held) = self.pointer.replace(note_index) {
                    if held == note_index {
                        return Vec::new();
                    }
                    actions.push(VoiceAction::Stop {
                        id: VoiceId::Pointer(held),
                    });
                }
                actions.push(VoiceAction::Start {
                    id: VoiceId::Pointer(note_index),
                    midi: note.midi,
                    note_index,
                });
                actions
            }
            InputEvent::PointerUp => match self.pointer.take() {
                Some(held) => vec![VoiceAction::Stop {
                    id: VoiceId::Pointer(held),
                }],
                None => Vec::new(),
            },
        }
    }

    /// Forget every held key and pointer without emitting stops.
    /// Used when the voices were already stopped wholesale.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.pointer = None;
    }

    /// Piano keys currently held by any input.
    pub fn held_notes(&self) -> [bool; KEY_COUNT] {
        let mut held = [false; KEY_COUNT];
        for idx in self.keys_down.iter().filter_map(|&key| table::index_of(key)) {
            held[idx] = true;
        }
        if let Some(idx) = self.pointer {
            held[idx] = true;
        }
        held
    }
}
