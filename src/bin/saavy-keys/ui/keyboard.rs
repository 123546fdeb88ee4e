//! Keyboard widget - draws the 13 keys and maps mouse positions back to them
//!
//! White keys split the width evenly. Black keys cover the upper part of
//! the boundary between two white keys and are hit-tested first, since they
//! sit on top.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_keys::keys::{KeyColor, KEY_COUNT, NOTES};

const WHITE_KEYS: u16 = 8;

/// Screen rectangles of every key for one keyboard area.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardLayout {
    keys: [Rect; KEY_COUNT],
}

impl KeyboardLayout {
    pub fn new(area: Rect) -> Self {
        let white_width = (area.width / WHITE_KEYS).max(1);
        let black_width = (white_width * 2 / 3).max(1);
        let black_height = (area.height * 3 / 5).max(1);

        let mut keys = [Rect::default(); KEY_COUNT];
        let mut whites = 0u16;
        for (rect, note) in keys.iter_mut().zip(NOTES.iter()) {
            *rect = match note.color {
                KeyColor::White => {
                    let x = area.x + whites * white_width;
                    whites += 1;
                    Rect::new(x, area.y, white_width, area.height)
                }
                KeyColor::Black => {
                    let x = (area.x + whites * white_width).saturating_sub(black_width / 2);
                    Rect::new(x, area.y, black_width, black_height)
                }
            };
        }
        Self { keys }.clipped(area)
    }

    fn clipped(mut self, area: Rect) -> Self {
        for rect in self.keys.iter_mut() {
            *rect = rect.intersection(area);
        }
        self
    }

    /// Index of the key under `(column, row)`.
    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        let inside = |idx: &usize| {
            let r = self.keys[*idx];
            column >= r.x && column < r.right() && row >= r.y && row < r.bottom()
        };
        let by_color = |color| (0..KEY_COUNT).filter(move |&i| NOTES[i].color == color);

        by_color(KeyColor::Black)
            .find(inside)
            .or_else(|| by_color(KeyColor::White).find(inside))
    }

    pub fn key(&self, index: usize) -> Rect {
        self.keys[index]
    }
}

/// Render the keyboard, highlighting active keys.
pub fn render_keyboard(frame: &mut Frame, layout: &KeyboardLayout, active: &[bool; KEY_COUNT]) {
    // White first so black keys draw over them
    for color in [KeyColor::White, KeyColor::Black] {
        for (idx, note) in NOTES.iter().enumerate().filter(|(_, n)| n.color == color) {
            let area = layout.key(idx);
            if area.is_empty() {
                continue;
            }

            let (bg, fg) = match (note.color, active[idx]) {
                (KeyColor::White, false) => (Color::White, Color::Black),
                (KeyColor::White, true) => (Color::Cyan, Color::Black),
                (KeyColor::Black, false) => (Color::Black, Color::Gray),
                (KeyColor::Black, true) => (Color::Magenta, Color::White),
            };

            // Labels at the bottom of the key
            let padding = area.height.saturating_sub(4) as usize;
            let mut lines = vec![Line::raw(""); padding];
            lines.push(Line::raw(note.name));
            lines.push(Line::raw(note.input_key.to_ascii_uppercase().to_string()));

            let key = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().bg(bg).fg(fg))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                );
            frame.render_widget(key, area);
        }
    }
}
