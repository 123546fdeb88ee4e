//! cpal output stream feeding from the software host

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use rtrb::Producer;
use tracing::{error, info};

use saavy_keys::{
    graph::{SharedHost, SoftwareHost, StreamControl},
    Error, Result, MAX_BLOCK_SIZE,
};

/// Host type the terminal app drives.
pub type DeviceHost = SharedHost<CpalStream>;

/// The device stream, paused while the host is suspended.
pub struct CpalStream(cpal::Stream);

impl StreamControl for CpalStream {
    fn play(&self) -> std::result::Result<(), String> {
        self.0.play().map_err(|err| err.to_string())
    }

    fn pause(&self) -> std::result::Result<(), String> {
        self.0.pause().map_err(|err| err.to_string())
    }
}

fn unavailable(err: impl std::fmt::Display) -> Error {
    Error::AudioUnavailable(err.to_string())
}

/// Open the default output device and start rendering into it.
///
/// Rendered samples are also pushed into `tap` for the oscilloscope.
pub fn open_output(tap: Producer<f32>) -> Result<DeviceHost> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| unavailable("no default output device available"))?;
    let config = device.default_output_config().map_err(unavailable)?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let engine = Arc::new(Mutex::new(SoftwareHost::new(sample_rate).with_tap(tap)));
    let render_engine = Arc::clone(&engine);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.config(),
            move |data: &mut [f32], _| {
                let mut engine = render_engine.lock();
                // Mono render, copied to every channel
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = chunk.len() / channels;
                    let block = &mut render_buf[..frames];
                    engine.render(block);
                    for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                        frame.fill(sample);
                    }
                }
            },
            |err| error!(error = %err, "output stream error"),
            None,
        )
        .map_err(unavailable)?;
    stream.play().map_err(unavailable)?;

    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate, channels, "output stream open"
    );
    Ok(SharedHost::with_stream(engine, CpalStream(stream)))
}
