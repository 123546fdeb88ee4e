//! Status bar widget - shows volume, waveform, octave, engine state and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_keys::{engine::EngineStatus, synth::SynthSettings};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    settings: &SynthSettings,
    status: &EngineStatus,
    voices: usize,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" saavy-keys ").borders(Borders::ALL);

    let status_color = match status {
        EngineStatus::Running => Color::Green,
        EngineStatus::Suspended | EngineStatus::Uninitialized => Color::Yellow,
        EngineStatus::Unavailable(_) => Color::Red,
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Vol: {:>3.0}%  ", settings.volume() * 100.0),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Wave: {:<8}  ", settings.waveform()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Octave: {:+}  ", settings.octave_shift()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Voices: {voices}  "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(status.to_string(), Style::default().fg(status_color)),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
