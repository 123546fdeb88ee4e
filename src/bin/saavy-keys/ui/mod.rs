//! TUI module for saavy-keys
//!
//! Draws the keyboard, a status bar and an oscilloscope of the output.

mod keyboard;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rtrb::Consumer;

use saavy_keys::{engine::EngineStatus, keys::KEY_COUNT, synth::SynthSettings};

pub use keyboard::KeyboardLayout;

use keyboard::render_keyboard;
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 1024;

/// Latest output samples, fed from the host's tap.
pub struct Scope {
    audio_rx: Consumer<f32>,
    buffer: Vec<f32>,
}

impl Scope {
    pub fn new(audio_rx: Consumer<f32>) -> Self {
        Self {
            audio_rx,
            buffer: vec![0.0; VIS_BUFFER_SIZE],
        }
    }

    /// Drain the ring buffer, keeping the last `VIS_BUFFER_SIZE` samples.
    pub fn poll(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.buffer.push(sample);
        }
        if self.buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.buffer.len() - VIS_BUFFER_SIZE;
            self.buffer.drain(0..excess);
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }
}

/// Everything the frame shows besides the scope.
pub struct View<'a> {
    pub settings: &'a SynthSettings,
    pub status: EngineStatus,
    pub voices: usize,
    pub active: [bool; KEY_COUNT],
    pub emulated_release: bool,
}

/// Render one frame. Returns the keyboard geometry for mouse hit-testing.
pub fn render(frame: &mut Frame, view: &View, scope: &Scope) -> KeyboardLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(7),    // Keyboard
            Constraint::Length(8), // Waveform
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    let stats = AudioStats::from_buffer(scope.samples());
    render_status(
        frame,
        chunks[0],
        view.settings,
        &view.status,
        view.voices,
        &stats,
    );

    let keyboard_block = Block::default().title(" Keys ").borders(Borders::ALL);
    let keyboard_inner = keyboard_block.inner(chunks[1]);
    frame.render_widget(keyboard_block, chunks[1]);
    let layout = KeyboardLayout::new(keyboard_inner);
    render_keyboard(frame, &layout, &view.active);

    let scope_color = if view.voices > 0 {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    render_waveform(frame, chunks[2], scope.samples(), scope_color);

    let mut help =
        String::from(" [A-K] Play  [Z/X] Octave  [Up/Down] Volume  [Tab] Waveform  [Esc] Quit");
    if view.emulated_release {
        help.push_str("  (no key release events: notes end shortly after the last repeat)");
    }
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);

    layout
}
