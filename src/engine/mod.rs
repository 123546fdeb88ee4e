//! Audio engine lifecycle.
//!
//! The host is not created at startup. Output devices may only start in
//! response to a user gesture (and opening one costs resources), so the
//! engine begins `Uninitialized`, holding a factory, and the first gesture
//! calls `activate`. That either produces a `Ready` engine with its master
//! bus, or records the failure once and stays `Unavailable`; later gestures
//! do not retry.

use std::fmt;

use tracing::{info, warn};

use crate::{
    error::Result,
    graph::host::{AudioHost, HostState},
    synth::master::MasterBus,
};

type HostFactory<H> = Box<dyn FnOnce() -> Result<H>>;

/// A created host and the master bus built on it.
pub struct Ready<H> {
    pub host: H,
    pub master: MasterBus,
}

enum Phase<H> {
    Uninitialized(HostFactory<H>),
    Ready(Ready<H>),
    Unavailable(String),
}

/// Snapshot of the lifecycle for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Waiting for the first gesture.
    Uninitialized,
    Running,
    Suspended,
    /// Creating the host failed; input still works but makes no sound.
    Unavailable(String),
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Uninitialized => f.write_str("press a key to start audio"),
            EngineStatus::Running => f.write_str("running"),
            EngineStatus::Suspended => f.write_str("suspended"),
            EngineStatus::Unavailable(reason) => write!(f, "no audio: {reason}"),
        }
    }
}

pub struct AudioEngine<H> {
    phase: Phase<H>,
}

impl<H: AudioHost> AudioEngine<H> {
    /// Defer host creation to the first `activate`.
    pub fn new(factory: impl FnOnce() -> Result<H> + 'static) -> Self {
        Self {
            phase: Phase::Uninitialized(Box::new(factory)),
        }
    }

    /// Create the host if this is the first call. Returns the ready engine,
    /// or `None` if the host is unavailable.
    pub fn activate(&mut self, volume: f32) -> Option<&mut Ready<H>> {
        if let Phase::Uninitialized(_) = self.phase {
            let placeholder = Phase::Unavailable(String::new());
            if let Phase::Uninitialized(factory) = std::mem::replace(&mut self.phase, placeholder) {
                self.phase = match factory() {
                    Ok(mut host) => {
                        if host.state() == HostState::Suspended {
                            host.resume();
                        }
                        let master = host.with_locked(|host| MasterBus::new(host, volume));
                        info!(volume = master.volume(), "audio engine ready");
                        Phase::Ready(Ready { host, master })
                    }
                    Err(err) => {
                        warn!(error = %err, "audio engine unavailable; continuing without sound");
                        Phase::Unavailable(err.to_string())
                    }
                };
            }
        }

        self.ready()
    }

    /// The ready engine, without activating.
    pub fn ready(&mut self) -> Option<&mut Ready<H>> {
        match &mut self.phase {
            Phase::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    pub fn status(&self) -> EngineStatus {
        match &self.phase {
            Phase::Uninitialized(_) => EngineStatus::Uninitialized,
            Phase::Ready(ready) => match ready.host.state() {
                HostState::Running => EngineStatus::Running,
                HostState::Suspended => EngineStatus::Suspended,
            },
            Phase::Unavailable(reason) => EngineStatus::Unavailable(reason.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, graph::software::SoftwareHost};
    use std::{cell::Cell, rc::Rc};

    #[test]
    fn host_is_created_on_first_activation_only() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut engine = AudioEngine::new(move || {
            counter.set(counter.get() + 1);
            Ok(SoftwareHost::new(48_000.0))
        });

        assert_eq!(engine.status(), EngineStatus::Uninitialized);
        assert!(engine.ready().is_none());
        assert_eq!(calls.get(), 0);

        assert!(engine.activate(0.5).is_some());
        assert!(engine.activate(0.5).is_some());
        assert_eq!(calls.get(), 1);
        assert_eq!(engine.status(), EngineStatus::Running);
    }

    #[test]
    fn ready_engine_has_master_on_destination() {
        let mut engine = AudioEngine::new(|| Ok(SoftwareHost::new(48_000.0)));
        let ready = engine.activate(0.4).unwrap();
        let destination = ready.host.destination();
        assert!(ready.host.is_connected(ready.master.input(), destination));
        assert_eq!(ready.master.volume(), 0.4);
    }

    #[test]
    fn suspended_host_is_resumed_on_activation() {
        let mut engine = AudioEngine::new(|| {
            let mut host = SoftwareHost::new(48_000.0);
            host.suspend();
            Ok(host)
        });
        engine.activate(1.0);
        assert_eq!(engine.status(), EngineStatus::Running);
    }

    #[test]
    fn unavailable_host_is_reported_and_not_retried() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut engine: AudioEngine<SoftwareHost> = AudioEngine::new(move || {
            counter.set(counter.get() + 1);
            Err(Error::AudioUnavailable("no output device".into()))
        });

        assert!(engine.activate(0.5).is_none());
        assert!(engine.activate(0.5).is_none());
        assert_eq!(calls.get(), 1);
        assert_eq!(
            engine.status(),
            EngineStatus::Unavailable("audio engine unavailable: no output device".into())
        );
    }
}
