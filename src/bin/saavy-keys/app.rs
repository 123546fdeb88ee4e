//! KeysApp - terminal event loop driving the piano

use std::{
    collections::HashMap,
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;
use rtrb::RingBuffer;
use tracing::{info, warn};

use saavy_keys::{
    engine::AudioEngine,
    keys::table,
    runtime::{Piano, Visibility},
    synth::SynthSettings,
};

use crate::{
    audio::{self, DeviceHost},
    ui::{self, KeyboardLayout, Scope, View, VIS_BUFFER_SIZE},
};

/// Poll interval (~60fps)
const FRAME: Duration = Duration::from_millis(16);
const VOLUME_STEP: f32 = 0.05;

/// Without release events, a key counts as held until this long after its
/// first press (covers the usual initial repeat delay)...
const LEGACY_FIRST_HOLD: Duration = Duration::from_millis(600);
/// ...and this long after its latest auto-repeat.
const LEGACY_REPEAT_HOLD: Duration = Duration::from_millis(150);

/// Key release emulation for terminals that only report presses.
#[derive(Default)]
struct LegacyRelease {
    deadlines: HashMap<char, Instant>,
}

impl LegacyRelease {
    /// Record a press. Returns true if the key was already held, which
    /// makes this press an auto-repeat.
    fn press(&mut self, key: char, now: Instant) -> bool {
        match self.deadlines.get_mut(&key) {
            Some(deadline) => {
                *deadline = now + LEGACY_REPEAT_HOLD;
                true
            }
            None => {
                self.deadlines.insert(key, now + LEGACY_FIRST_HOLD);
                false
            }
        }
    }

    /// Keys whose hold ran out, now treated as released.
    fn expired(&mut self, now: Instant) -> Vec<char> {
        let keys: Vec<char> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&key, _)| key)
            .collect();
        for key in &keys {
            self.deadlines.remove(key);
        }
        keys
    }

    fn clear(&mut self) {
        self.deadlines.clear();
    }
}

pub struct KeysApp {
    piano: Piano<DeviceHost>,
    scope: Scope,
    layout: KeyboardLayout,
    legacy: LegacyRelease,
    /// Terminal reports key release events.
    enhanced: bool,
    should_quit: bool,
}

impl KeysApp {
    pub fn new(settings: SynthSettings) -> Self {
        let (tap, audio_rx) = RingBuffer::new(VIS_BUFFER_SIZE * 8);
        // Opened on the first key or click
        let engine = AudioEngine::new(move || audio::open_output(tap));

        Self {
            piano: Piano::new(engine, settings),
            scope: Scope::new(audio_rx),
            layout: KeyboardLayout::default(),
            legacy: LegacyRelease::default(),
            enhanced: false,
            should_quit: false,
        }
    }

    /// Run until Esc or Ctrl+C.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if !self.enhanced {
            warn!("terminal does not report key releases; emulating them from repeats");
        }

        let mut out = stdout();
        execute!(out, EnableMouseCapture, EnableFocusChange)?;
        if self.enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }

        let result = self.event_loop(terminal);

        let restored = if self.enhanced {
            execute!(out, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        }
        .and_then(|()| execute!(out, DisableFocusChange, DisableMouseCapture));

        info!("quit");
        result?;
        restored?;
        Ok(())
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.scope.poll();
            for key in self.legacy.expired(now) {
                self.piano.key_up(key, now);
            }
            self.piano.tick(now);

            let view = View {
                settings: self.piano.settings(),
                status: self.piano.status(),
                voices: self.piano.voice_count(),
                active: self.piano.active_notes(),
                emulated_release: !self.enhanced,
            };
            let scope = &self.scope;
            let layout = &mut self.layout;
            terminal.draw(|frame| *layout = ui::render(frame, &view, scope))?;

            if event::poll(FRAME)? {
                let now = Instant::now();
                match event::read()? {
                    Event::Key(key) => self.handle_key(key, now),
                    Event::Mouse(mouse) => self.handle_mouse(mouse, now),
                    Event::FocusLost => {
                        self.legacy.clear();
                        self.piano.set_visibility(Visibility::Hidden, now);
                    }
                    Event::FocusGained => self.piano.set_visibility(Visibility::Visible, now),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl && table::index_of(c.to_ascii_lowercase()).is_some() => {
                self.handle_note_key(c, key.kind, now);
            }
            _ if key.kind != KeyEventKind::Press => {}
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Up => {
                let volume = self.piano.settings().volume() + VOLUME_STEP;
                self.piano.set_volume(volume);
            }
            KeyCode::Down => {
                let volume = self.piano.settings().volume() - VOLUME_STEP;
                self.piano.set_volume(volume);
            }
            KeyCode::Char('z') | KeyCode::Char('Z') => {
                self.piano.octave_down();
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.piano.octave_up();
            }
            KeyCode::Tab => {
                self.piano.cycle_waveform();
            }
            _ => {}
        }
    }

    fn handle_note_key(&mut self, c: char, kind: KeyEventKind, now: Instant) {
        match kind {
            KeyEventKind::Press if self.enhanced => self.piano.key_down(c, false, now),
            KeyEventKind::Press => {
                let repeat = self.legacy.press(c.to_ascii_lowercase(), now);
                self.piano.key_down(c, repeat, now);
            }
            KeyEventKind::Repeat => self.piano.key_down(c, true, now),
            KeyEventKind::Release => self.piano.key_up(c, now),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.layout.hit(mouse.column, mouse.row) {
                    self.piano.pointer_down(index, now);
                }
            }
            // Released anywhere, not only over the pressed key
            MouseEventKind::Up(_) => self.piano.pointer_up(now),
            _ => {}
        }
    }
}
