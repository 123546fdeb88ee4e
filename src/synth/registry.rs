/*
Voice Registry
==============

Maps a voice id to the synthesis state sounding for it. There is no voice
pool and no stealing: a voice exists from its start request until the
cleanup that follows its release.

Lifecycle
---------

    start(id) ──→ Held ──stop(id)──→ Releasing ──deadline──→ removed
                   │                     │
                   └─ start(id): no-op   └─ start(id): superseded by a new
                                            Held voice; the old one keeps
                                            fading until its own cleanup

Cleanup and generations
-----------------------

Every start takes a fresh generation number. A stop records a pending
cleanup carrying the stopped voice's nodes and its generation, due once the
release tail has played out. When it fires:

  - the stopped voice's nodes are always disconnected (they belong to it
    alone, even if the id has since been restarted)
  - the registry entry is removed only if it still carries the same
    generation

So stop → start → (stale cleanup fires) leaves the new voice untouched.

Each call reads the audio clock and then writes several events. A host
shared with an audio thread must not render in between, so callers run
these inside `AudioHost::with_locked`.

Cleanup deadlines are wall-clock `Instant`s polled by the caller, while the
gain curve itself is scheduled on the audio clock. The two must not be
mixed: while the host is suspended the audio clock stands still, but
pending cleanups still have to run.
*/

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    graph::{host::AudioHost, node::NodeId},
    io::converter::{midi_to_frequency, transpose_octaves},
    keys::table::KEY_COUNT,
    synth::{
        envelope::Envelope,
        master::MasterBus,
        settings::SynthSettings,
        voice::{Voice, VoiceId, VoiceState},
    },
};

#[derive(Debug)]
struct PendingCleanup {
    id: VoiceId,
    generation: u64,
    oscillator: NodeId,
    gain: NodeId,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct VoiceRegistry {
    envelope: Envelope,
    voices: HashMap<VoiceId, Voice>,
    cleanups: Vec<PendingCleanup>,
    next_generation: u64,
}

impl VoiceRegistry {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            ..Self::default()
        }
    }

    /// Start a voice for `id` unless one is already held.
    ///
    /// The octave shift and waveform are taken from `settings` now and never
    /// revisited. Returns true if a new voice was created.
    pub fn start<H: AudioHost + ?Sized>(
        &mut self,
        host: &mut H,
        master: &MasterBus,
        id: VoiceId,
        midi: u8,
        note_index: usize,
        settings: &SynthSettings,
    ) -> bool {
        if self.voices.get(&id).is_some_and(Voice::is_held) {
            return false;
        }

        let midi = transpose_octaves(midi, settings.octave_shift());
        let frequency = midi_to_frequency(f64::from(midi));
        let now = host.current_time();

        let oscillator = host.create_oscillator(settings.waveform(), frequency);
        let gain = host.create_gain(self.envelope.floor);
        host.connect(oscillator, gain);
        host.connect(gain, master.input());
        self.envelope.schedule_onset(host, gain, now);
        host.start_oscillator(oscillator, now);

        let generation = self.next_generation;
        self.next_generation += 1;

        debug!(voice = %id, midi, frequency, generation, "voice started");

        // A releasing voice under the same id is replaced here; its pending
        // cleanup still owns and disconnects its nodes.
        self.voices.insert(
            id,
            Voice {
                id,
                oscillator,
                gain,
                midi,
                frequency,
                note_index,
                start_time: now,
                release_duration: self.envelope.release,
                generation,
                state: VoiceState::Held,
            },
        );
        true
    }

    /// Release the voice held for `id`. Returns true if a release began.
    pub fn stop<H: AudioHost + ?Sized>(&mut self, host: &mut H, id: VoiceId, now: Instant) -> bool {
        let Some(voice) = self.voices.get_mut(&id) else {
            return false;
        };
        if !voice.is_held() {
            return false;
        }

        let audio_now = host.current_time();
        let stop_at = self
            .envelope
            .schedule_release(host, voice.gain, voice.oscillator, audio_now);
        voice.state = VoiceState::Releasing;

        self.cleanups.push(PendingCleanup {
            id,
            generation: voice.generation,
            oscillator: voice.oscillator,
            gain: voice.gain,
            due: now + Duration::from_secs_f64(self.envelope.tail()),
        });

        debug!(voice = %id, stop_at, generation = voice.generation, "voice released");
        true
    }

    /// Release every held voice. Returns how many were released.
    pub fn stop_all<H: AudioHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> usize {
        let held: Vec<VoiceId> = self
            .voices
            .values()
            .filter(|v| v.is_held())
            .map(|v| v.id)
            .collect();

        let mut released = 0;
        for id in held {
            if self.stop(host, id, now) {
                released += 1;
            }
        }
        released
    }

    /// Run every cleanup due at `now`. Returns how many fired.
    pub fn collect_expired<H: AudioHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> usize {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .cleanups
            .drain(..)
            .partition(|cleanup| cleanup.due <= now);
        self.cleanups = pending;

        for cleanup in &due {
            host.disconnect(cleanup.oscillator);
            host.disconnect(cleanup.gain);

            let current = self
                .voices
                .get(&cleanup.id)
                .is_some_and(|v| v.generation == cleanup.generation);
            if current {
                self.voices.remove(&cleanup.id);
            }
            debug!(
                voice = %cleanup.id,
                generation = cleanup.generation,
                removed = current,
                "voice cleaned up"
            );
        }

        due.len()
    }

    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(&id)
    }

    /// Registered voices, held or releasing.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn held_count(&self) -> usize {
        self.voices.values().filter(|v| v.is_held()).count()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.len()
    }

    /// Which piano keys have a held voice.
    pub fn active_notes(&self) -> [bool; KEY_COUNT] {
        let mut active = [false; KEY_COUNT];
        for voice in self.voices.values().filter(|v| v.is_held()) {
            if let Some(slot) = active.get_mut(voice.note_index) {
                *slot = true;
            }
        }
        active
    }
}
