use anyhow::{anyhow, Result};
use assert_no_alloc::assert_no_alloc;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine::Engine;
use crate::{INTERNAL_BUFFER_SIZE, SAMPLE_RATE};

/// Owns the output stream. The engine renders a mono master bus which is
/// duplicated across the device's channels. Dropping the host stops audio.
pub struct Host {
    _stream: cpal::Stream,
}

impl Host {
    pub fn run(mut engine: Engine) -> Result<Host> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no output device available"))?;

        let channels = device.default_output_config()?.channels() as usize;
        let config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(SAMPLE_RATE as u32),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut bus = vec![0.0f32; INTERNAL_BUFFER_SIZE];
        let stream = device.build_output_stream(
            &config,
            move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
                assert_no_alloc(|| {
                    // The device callback can hand us more frames than the
                    // internal bus holds, so render in slices.
                    for out in output.chunks_mut(bus.len() * channels) {
                        let frames = out.len() / channels;
                        let block = &mut bus[..frames];
                        engine.process(block);
                        for (frame, &sample) in out.chunks_mut(channels).zip(block.iter()) {
                            frame.fill(sample);
                        }
                    }
                });
            },
            |err| eprintln!("error in audio stream: {}", err),
            None,
        )?;
        stream.play()?;

        Ok(Host { _stream: stream })
    }
}
