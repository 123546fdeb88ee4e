//! Call-ordering tests against a host that records what the piano asks of it.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use approx::assert_relative_eq;
use saavy_keys::{
    dsp::Waveform,
    engine::AudioEngine,
    graph::{AudioHost, HostState, NodeId, SoftwareHost},
    io::midi_to_frequency,
    runtime::{Piano, Visibility},
    synth::{SynthSettings, VoiceId},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Lock,
    Unlock,
    Resume,
    Suspend,
    CreateOscillator { frequency: f64 },
    StopOscillator { node: NodeId },
    Disconnect { node: NodeId },
    CancelGain { node: NodeId },
    SetGain { node: NodeId },
}

type Log = Rc<RefCell<Vec<Call>>>;

/// Software host that logs lifecycle calls before performing them.
struct RecordingHost {
    inner: SoftwareHost,
    log: Log,
}

impl RecordingHost {
    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl AudioHost for RecordingHost {
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn state(&self) -> HostState {
        self.inner.state()
    }

    fn resume(&mut self) {
        self.record(Call::Resume);
        self.inner.resume();
    }

    fn suspend(&mut self) {
        self.record(Call::Suspend);
        self.inner.suspend();
    }

    fn destination(&self) -> NodeId {
        self.inner.destination()
    }

    fn create_oscillator(&mut self, waveform: Waveform, frequency: f64) -> NodeId {
        self.record(Call::CreateOscillator { frequency });
        self.inner.create_oscillator(waveform, frequency)
    }

    fn create_gain(&mut self, value: f32) -> NodeId {
        self.inner.create_gain(value)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        self.inner.connect(from, to)
    }

    fn disconnect(&mut self, node: NodeId) {
        self.record(Call::Disconnect { node });
        self.inner.disconnect(node)
    }

    fn start_oscillator(&mut self, oscillator: NodeId, when: f64) {
        self.inner.start_oscillator(oscillator, when)
    }

    fn stop_oscillator(&mut self, oscillator: NodeId, when: f64) {
        self.record(Call::StopOscillator { node: oscillator });
        self.inner.stop_oscillator(oscillator, when)
    }

    fn set_gain_at(&mut self, gain: NodeId, value: f32, time: f64) {
        self.record(Call::SetGain { node: gain });
        self.inner.set_gain_at(gain, value, time)
    }

    fn exponential_ramp_gain_to(&mut self, gain: NodeId, value: f32, time: f64) {
        self.inner.exponential_ramp_gain_to(gain, value, time)
    }

    fn cancel_gain_from(&mut self, gain: NodeId, time: f64) {
        self.record(Call::CancelGain { node: gain });
        self.inner.cancel_gain_from(gain, time)
    }

    fn gain_at(&self, gain: NodeId, time: f64) -> Option<f32> {
        self.inner.gain_at(gain, time)
    }

    fn with_locked<R>(&mut self, f: impl FnOnce(&mut dyn AudioHost) -> R) -> R {
        self.record(Call::Lock);
        let out = f(self);
        self.record(Call::Unlock);
        out
    }
}

fn recording_piano(settings: SynthSettings) -> (Piano<RecordingHost>, Log) {
    let log: Log = Rc::default();
    let host_log = Rc::clone(&log);
    let engine = AudioEngine::new(move || {
        Ok(RecordingHost {
            inner: SoftwareHost::new(48_000.0),
            log: host_log,
        })
    });
    (Piano::new(engine, settings), log)
}

fn count(log: &Log, matches: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| matches(call)).count()
}

/// Split the log into locked batches, failing on any graph write made
/// outside one.
fn batches(log: &Log) -> Vec<Vec<Call>> {
    let mut batches = Vec::new();
    let mut current: Option<Vec<Call>> = None;
    for call in log.borrow().iter() {
        match call {
            Call::Lock => current = Some(Vec::new()),
            Call::Unlock => batches.extend(current.take()),
            Call::Resume | Call::Suspend => {}
            other => match current.as_mut() {
                Some(batch) => batch.push(other.clone()),
                None => panic!("{other:?} made outside a locked batch"),
            },
        }
    }
    batches
}

#[test]
fn hiding_stops_every_voice_before_suspending() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let now = Instant::now();
    piano.key_down('a', false, now);
    piano.pointer_down(9, now);
    log.borrow_mut().clear();

    piano.set_visibility(Visibility::Hidden, now);
    {
        let calls = log.borrow();
        let suspend = calls
            .iter()
            .position(|c| *c == Call::Suspend)
            .expect("host was not suspended");
        let stops: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Call::StopOscillator { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(stops.len(), 2);
        assert!(stops.iter().all(|&i| i < suspend));
    }

    log.borrow_mut().clear();
    piano.set_visibility(Visibility::Visible, now);
    assert_eq!(*log.borrow(), vec![Call::Resume]);
}

#[test]
fn repeated_presses_create_one_oscillator() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let now = Instant::now();
    for _ in 0..3 {
        piano.key_down('e', false, now);
    }
    piano.key_down('e', true, now);

    assert_eq!(
        count(&log, |c| matches!(c, Call::CreateOscillator { .. })),
        1
    );
    assert!(piano.registry().get(VoiceId::Keyboard('e')).is_some());
}

#[test]
fn stopping_an_unknown_voice_touches_nothing() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let now = Instant::now();
    piano.key_down('a', false, now);
    log.borrow_mut().clear();

    piano.key_up('s', now);
    piano.pointer_up(now);
    assert_eq!(count(&log, |c| !matches!(c, Call::Lock | Call::Unlock)), 0);
}

#[test]
fn octave_shift_applies_to_new_voices_only() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let now = Instant::now();
    piano.key_down('a', false, now);
    assert_eq!(piano.octave_up(), 1);
    piano.pointer_down(0, now);

    let created: Vec<f64> = log
        .borrow()
        .iter()
        .filter_map(|c| match c {
            Call::CreateOscillator { frequency } => Some(*frequency),
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), 2);
    assert_relative_eq!(created[0], midi_to_frequency(60.0), epsilon = 1e-9);
    assert_relative_eq!(created[1], midi_to_frequency(72.0), epsilon = 1e-9);

    let held = piano.registry().get(VoiceId::Keyboard('a')).unwrap();
    assert_relative_eq!(held.frequency, 261.63, epsilon = 0.01);
}

#[test]
fn stale_cleanup_leaves_the_restarted_voice_alone() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let start = Instant::now();
    piano.key_down('g', false, start);
    let first = piano.registry().get(VoiceId::Keyboard('g')).unwrap().oscillator;

    piano.key_up('g', start);
    piano.key_down('g', false, start + Duration::from_millis(50));
    let second = piano.registry().get(VoiceId::Keyboard('g')).unwrap().oscillator;
    assert_ne!(first, second);

    piano.tick(start + Duration::from_secs(1));

    assert_eq!(
        count(&log, |c| *c == Call::Disconnect { node: first }),
        1
    );
    assert_eq!(
        count(&log, |c| *c == Call::Disconnect { node: second }),
        0
    );
    assert_eq!(piano.voice_count(), 1);
    let host = &piano.engine().ready().unwrap().host;
    assert!(host.inner.contains(second));
    assert!(!host.inner.contains(first));
}

#[test]
fn every_envelope_write_lands_in_one_batch() {
    let (mut piano, log) = recording_piano(SynthSettings::default());
    let start = Instant::now();
    piano.key_down('d', false, start);
    // Released during the attack, while the onset ramps are still pending
    piano.key_up('d', start);
    piano.pointer_down(3, start);
    piano.pointer_down(5, start);
    piano.set_volume(0.4);
    piano.tick(start + Duration::from_secs(1));

    let batches = batches(&log);
    // master bus, start, stop, pointer start, pointer handover, volume, cleanup
    assert_eq!(batches.len(), 7);

    // The release's cancel and re-anchor share a batch with its stop
    let release = batches
        .iter()
        .find(|b| b.iter().any(|c| matches!(c, Call::CancelGain { .. })))
        .expect("release was scheduled");
    let Some(Call::CancelGain { node }) = release
        .iter()
        .find(|c| matches!(c, Call::CancelGain { .. }))
        .cloned()
    else {
        unreachable!()
    };
    assert!(release.contains(&Call::SetGain { node }));
    assert!(release
        .iter()
        .any(|c| matches!(c, Call::StopOscillator { .. })));

    // The pointer handover stops one voice and starts the next together
    let handover = &batches[4];
    assert!(handover
        .iter()
        .any(|c| matches!(c, Call::StopOscillator { .. })));
    assert!(handover
        .iter()
        .any(|c| matches!(c, Call::CreateOscillator { .. })));
}
