//! Piano - the application root
//!
//! Owns the settings, the engine lifecycle, the voice registry and the input
//! router, and is the only thing a front end talks to. Gestures come in as
//! input events; the piano pushes back a single piece of UI state, which
//! keys are active.

use std::time::Instant;

use tracing::info;

use crate::{
    dsp::oscillator::Waveform,
    engine::{AudioEngine, EngineStatus, Ready},
    graph::host::AudioHost,
    keys::{
        router::{InputEvent, InputRouter, VoiceAction},
        table::KEY_COUNT,
    },
    synth::{envelope::Envelope, registry::VoiceRegistry, settings::SynthSettings},
};

/// Whether the front end is visible (focused) or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

pub struct Piano<H> {
    engine: AudioEngine<H>,
    settings: SynthSettings,
    registry: VoiceRegistry,
    router: InputRouter,
    visibility: Visibility,
}

impl<H: AudioHost> Piano<H> {
    pub fn new(engine: AudioEngine<H>, settings: SynthSettings) -> Self {
        Self::with_envelope(engine, settings, Envelope::default())
    }

    pub fn with_envelope(engine: AudioEngine<H>, settings: SynthSettings, envelope: Envelope) -> Self {
        Self {
            engine,
            settings,
            registry: VoiceRegistry::new(envelope),
            router: InputRouter::new(),
            visibility: Visibility::Visible,
        }
    }

    /// Feed one input event. Presses count as user gestures and activate the
    /// audio engine the first time.
    pub fn handle(&mut self, event: InputEvent, now: Instant) {
        let is_press = matches!(
            event,
            InputEvent::KeyDown { .. } | InputEvent::PointerDown { .. }
        );
        if is_press {
            if self.visibility == Visibility::Hidden {
                return;
            }
            self.engine.activate(self.settings.volume());
        }

        let actions = self.router.route(event);
        if actions.is_empty() {
            return;
        }
        let Some(Ready { host, master }) = self.engine.ready() else {
            return;
        };

        // One batch per event: the clock read and every envelope write land
        // between the same two rendered blocks
        let registry = &mut self.registry;
        let settings = &self.settings;
        host.with_locked(|host| {
            for action in actions {
                match action {
                    VoiceAction::Start {
                        id,
                        midi,
                        note_index,
                    } => {
                        registry.start(host, master, id, midi, note_index, settings);
                    }
                    VoiceAction::Stop { id } => {
                        registry.stop(host, id, now);
                    }
                }
            }
        });
    }

    pub fn key_down(&mut self, key: char, repeat: bool, now: Instant) {
        self.handle(InputEvent::KeyDown { key, repeat }, now);
    }

    pub fn key_up(&mut self, key: char, now: Instant) {
        self.handle(InputEvent::KeyUp { key }, now);
    }

    pub fn pointer_down(&mut self, note_index: usize, now: Instant) {
        self.handle(InputEvent::PointerDown { note_index }, now);
    }

    pub fn pointer_up(&mut self, now: Instant) {
        self.handle(InputEvent::PointerUp, now);
    }

    /// Hiding stops every voice before suspending the host, so nothing is
    /// left sounding (or stuck) while the clock is frozen.
    pub fn set_visibility(&mut self, visibility: Visibility, now: Instant) {
        if visibility == self.visibility {
            return;
        }
        self.visibility = visibility;

        match visibility {
            Visibility::Hidden => {
                self.router.release_all();
                if let Some(Ready { host, .. }) = self.engine.ready() {
                    let registry = &mut self.registry;
                    let stopped = host.with_locked(|host| registry.stop_all(host, now));
                    host.suspend();
                    info!(stopped, "hidden; audio suspended");
                }
            }
            Visibility::Visible => {
                if let Some(ready) = self.engine.ready() {
                    ready.host.resume();
                    info!("visible; audio resumed");
                }
            }
        }
    }

    /// Run due voice cleanups. Call regularly from the event loop.
    pub fn tick(&mut self, now: Instant) -> usize {
        match self.engine.ready() {
            Some(Ready { host, .. }) => {
                let registry = &mut self.registry;
                host.with_locked(|host| registry.collect_expired(host, now))
            }
            None => 0,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = self.settings.set_volume(volume);
        if let Some(Ready { host, master }) = self.engine.ready() {
            host.with_locked(|host| master.set_volume(host, volume));
        }
    }

    pub fn octave_up(&mut self) -> i8 {
        self.settings.octave_up()
    }

    pub fn octave_down(&mut self) -> i8 {
        self.settings.octave_down()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.settings.set_waveform(waveform);
    }

    pub fn cycle_waveform(&mut self) -> Waveform {
        self.settings.cycle_waveform()
    }

    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    pub fn status(&self) -> EngineStatus {
        self.engine.status()
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn engine(&mut self) -> &mut AudioEngine<H> {
        &mut self.engine
    }

    /// Keys to draw as pressed. Without an engine this falls back to what
    /// the router holds, so the keyboard still responds when silent.
    pub fn active_notes(&self) -> [bool; KEY_COUNT] {
        if self.engine.is_ready() {
            self.registry.active_notes()
        } else {
            self.router.held_notes()
        }
    }

    /// Voices currently registered, held or releasing.
    pub fn voice_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        graph::{host::HostState, software::SoftwareHost},
        synth::voice::VoiceId,
    };
    use std::time::Duration;

    fn piano() -> Piano<SoftwareHost> {
        let engine = AudioEngine::new(|| Ok(SoftwareHost::new(48_000.0)));
        Piano::new(engine, SynthSettings::default())
    }

    fn host(piano: &mut Piano<SoftwareHost>) -> &mut SoftwareHost {
        &mut piano.engine().ready().unwrap().host
    }

    #[test]
    fn first_press_activates_engine() {
        let mut piano = piano();
        let now = Instant::now();
        assert_eq!(piano.status(), EngineStatus::Uninitialized);

        piano.key_up('a', now);
        assert_eq!(piano.status(), EngineStatus::Uninitialized);

        piano.key_down('a', false, now);
        assert_eq!(piano.status(), EngineStatus::Running);
        assert_eq!(piano.voice_count(), 1);
    }

    #[test]
    fn repeated_key_down_keeps_one_voice() {
        let mut piano = piano();
        let now = Instant::now();
        piano.key_down('j', false, now);
        piano.key_down('j', true, now);
        piano.key_down('j', false, now);

        assert_eq!(piano.voice_count(), 1);
        assert!(piano.registry().get(VoiceId::Keyboard('j')).is_some());
    }

    #[test]
    fn stop_then_restart_before_cleanup() {
        let mut piano = piano();
        let now = Instant::now();
        piano.key_down('g', false, now);
        piano.key_up('g', now);
        piano.key_down('g', false, now);

        piano.tick(now + Duration::from_secs(1));
        let voice = piano.registry().get(VoiceId::Keyboard('g')).unwrap();
        assert!(voice.is_held());
        assert_eq!(piano.voice_count(), 1);
    }

    #[test]
    fn pointer_release_off_key_still_stops() {
        let mut piano = piano();
        let now = Instant::now();
        piano.pointer_down(7, now);
        assert!(piano.active_notes()[7]);

        piano.pointer_up(now);
        assert!(!piano.active_notes()[7]);
        piano.tick(now + Duration::from_secs(1));
        assert_eq!(piano.voice_count(), 0);
    }

    #[test]
    fn hide_stops_voices_then_suspends_and_show_resumes() {
        let mut piano = piano();
        let now = Instant::now();
        piano.key_down('a', false, now);
        piano.pointer_down(4, now);
        assert_eq!(piano.registry().held_count(), 2);

        piano.set_visibility(Visibility::Hidden, now);
        assert_eq!(piano.registry().held_count(), 0);
        assert_eq!(piano.registry().pending_cleanups(), 2);
        assert_eq!(host(&mut piano).state(), HostState::Suspended);

        // input while hidden is ignored
        piano.key_down('s', false, now);
        assert_eq!(piano.registry().held_count(), 0);

        piano.set_visibility(Visibility::Visible, now);
        assert_eq!(host(&mut piano).state(), HostState::Running);

        // keys held across the focus loss do not stay latched
        piano.key_down('a', false, now);
        assert_eq!(piano.registry().held_count(), 1);
    }

    #[test]
    fn volume_reaches_master_bus() {
        let mut piano = piano();
        let now = Instant::now();
        piano.key_down('a', false, now);
        piano.set_volume(0.2);

        let ready = piano.engine().ready().unwrap();
        assert_eq!(ready.master.volume(), 0.2);
        let t = ready.host.current_time();
        assert_eq!(ready.host.gain_at(ready.master.input(), t), Some(0.2));
    }

    #[test]
    fn octave_change_only_affects_new_voices() {
        let mut piano = piano();
        let now = Instant::now();
        piano.key_down('a', false, now);
        piano.octave_up();
        piano.pointer_down(0, now);

        let kbd = piano.registry().get(VoiceId::Keyboard('a')).unwrap();
        let ptr = piano.registry().get(VoiceId::Pointer(0)).unwrap();
        assert_eq!(kbd.midi, 60);
        assert_eq!(ptr.midi, 72);
    }

    #[test]
    fn silent_piano_still_tracks_keys() {
        let engine: AudioEngine<SoftwareHost> =
            AudioEngine::new(|| Err(Error::AudioUnavailable("no device".into())));
        let mut piano = Piano::new(engine, SynthSettings::default());
        let now = Instant::now();

        piano.key_down('d', false, now);
        assert!(matches!(piano.status(), EngineStatus::Unavailable(_)));
        assert!(piano.active_notes()[4]);
        assert_eq!(piano.voice_count(), 0);

        piano.key_up('d', now);
        assert!(!piano.active_notes()[4]);
        assert_eq!(piano.tick(now), 0);
    }
}
