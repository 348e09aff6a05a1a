//! Real-time audio playback using cpal

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{AudioBackend, SharedChain};
use crate::error::{Error, Result};

/// Output device backend
pub struct Player {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open the default output device, or the first device whose name
    /// contains `device_name`.
    ///
    /// The device's default config is used unless a sample rate or buffer
    /// size is requested.
    pub fn open(device_name: Option<&str>, sample_rate: Option<u32>, buffer_size: Option<u32>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| Error::Backend(e.to_string()))?
                .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false))
                .ok_or_else(|| Error::Backend(format!("no output device matching '{wanted}'")))?,
            None => host
                .default_output_device()
                .ok_or_else(|| Error::Backend("no output device available".to_string()))?,
        };

        let default_config = device
            .default_output_config()
            .map_err(|e| Error::Backend(e.to_string()))?;
        let sample_format = default_config.sample_format();
        let mut config: StreamConfig = default_config.into();
        if let Some(rate) = sample_rate {
            config.sample_rate = cpal::SampleRate(rate);
        }
        if let Some(frames) = buffer_size {
            config.buffer_size = BufferSize::Fixed(frames);
        }

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?sample_format,
            "opened output device"
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        chain: SharedChain,
    ) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let running = self.running.clone();

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::SeqCst) {
                        data.fill(T::from_sample(0.0f32));
                        return;
                    }

                    if let Ok(mut chain) = chain.try_lock() {
                        for frame in data.chunks_mut(channels) {
                            let sample = chain.process() as f32;
                            for channel_sample in frame.iter_mut() {
                                *channel_sample = T::from_sample(sample);
                            }
                        }
                    } else {
                        // Control side holds the chain for a swap
                        data.fill(T::from_sample(0.0f32));
                    }
                },
                |err| {
                    error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(stream)
    }
}

impl AudioBackend for Player {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn is_suspended(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }

    fn resume(&mut self, chain: &SharedChain) -> Result<()> {
        if self.stream.is_none() {
            let stream = match self.sample_format {
                SampleFormat::F32 => self.build_stream::<f32>(chain.clone())?,
                SampleFormat::I16 => self.build_stream::<i16>(chain.clone())?,
                SampleFormat::U16 => self.build_stream::<u16>(chain.clone())?,
                other => {
                    return Err(Error::Backend(format!("unsupported sample format {other:?}")))
                }
            };
            self.stream = Some(stream);
        }

        if let Some(stream) = &self.stream {
            stream.play().map_err(|e| Error::Backend(e.to_string()))?;
        }
        self.running.store(true, Ordering::SeqCst);
        debug!("output stream running");
        Ok(())
    }

    fn suspend(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                debug!("pause not supported: {}", e);
            }
        }
    }
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
