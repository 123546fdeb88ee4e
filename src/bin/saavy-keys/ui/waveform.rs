//! Oscilloscope widget for the master output
//!
//! The vertical range follows the loudest recent sample (never zooming in
//! past `MIN_RANGE`), so a quiet note at low volume still fills the view.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

const MIN_RANGE: f64 = 0.05;

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32], color: Color) {
    let range = samples
        .iter()
        .fold(0.0f64, |acc, &s| acc.max(f64::from(s.abs())))
        .clamp(MIN_RANGE, 1.0);

    let width = samples.len().max(1) as f64;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / width, f64::from(s)))
        .collect();

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let dim = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![trace])
        .block(Block::default().title(" Output ").borders(Borders::ALL))
        .x_axis(Axis::default().bounds([0.0, 1.0]).style(dim))
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .labels([
                    Span::raw(format!("-{range:.2}")),
                    Span::raw(format!("{range:.2}")),
                ])
                .style(dim),
        );

    frame.render_widget(chart, area);
}
