//! saavy-keys - a thirteen-key piano in the terminal
//!
//! Run with: cargo run -- --waveform triangle

mod app;
mod audio;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{crate_version, Parser};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::KeysApp;
use saavy_keys::{dsp::Waveform, synth::SynthSettings};

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    about = "Play a one-octave piano from the computer keyboard or the mouse."
)]
struct Cli {
    /// Master volume, 0.0 to 1.0.
    #[arg(long, default_value_t = 0.7)]
    volume: f32,
    /// Oscillator waveform: sine, sawtooth or triangle.
    #[arg(long, default_value_t = Waveform::Sine)]
    waveform: Waveform,
    /// Octave shift applied to new notes, -2 to 2.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    octave: i8,
    /// Where to write logs. The terminal is taken by the UI.
    #[arg(long, default_value = "saavy-keys.log")]
    log_file: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .wrap_err_with(|| format!("failed to create log file {}", cli.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let settings = SynthSettings::new(cli.volume, cli.waveform, cli.octave);
    tracing::info!(
        volume = settings.volume(),
        waveform = %settings.waveform(),
        octave = settings.octave_shift(),
        "starting"
    );

    let mut terminal = ratatui::init();
    let result = KeysApp::new(settings).run(&mut terminal);
    ratatui::restore();
    result
}
