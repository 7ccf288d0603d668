// Moteur audio - Callback CPAL temps-réel
//
// The callback owns a `ClickPlayer`. At the top of every buffer it drains the
// click channel, converts each click's clock timestamp to a sample index on the
// shared `AudioClock`, then renders the buffer and advances the clock by the
// number of frames written. The clock therefore *is* the sound card's position:
// the scheduler and the render loop read the same counter the audio is played from.
//
// Supported device formats: F32, I16, U16. Rendering is done in f32 and
// converted per frame through CPAL's `FromSample<f32>`.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::timing::AudioClock;
use crate::audio::{EngineError, EngineResult};
use crate::messaging::channels::ClickConsumer;
use crate::sequencer::metronome::ClickPlayer;

/// Clicks the audio callback had to drop because the player was full.
/// Counted lock-free in the callback, reported from the control thread.
#[derive(Debug, Clone, Default)]
pub struct DroppedClicks {
    count: Arc<AtomicU64>,
    reported: u64,
}

impl DroppedClicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Real-time safe
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Drops since this handle last reported
    pub fn take_unreported(&mut self) -> u64 {
        let total = self.total();
        let fresh = total.saturating_sub(self.reported);
        self.reported = total;
        fresh
    }

    /// Log a warning for drops since the last report; returns how many
    pub fn report(&mut self) -> u64 {
        let fresh = self.take_unreported();
        if fresh > 0 {
            log::warn!(
                "{} click(s) dropped, player queue full ({} total)",
                fresh,
                self.reported
            );
        }
        fresh
    }
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    clock: AudioClock,
    dropped: DroppedClicks,
}

impl AudioEngine {
    /// Open the default output device and start rendering clicks from `click_rx`
    pub fn new(click_rx: ClickConsumer) -> EngineResult<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(EngineError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let clock = AudioClock::new(sample_rate);
        let dropped = DroppedClicks::new();
        let shared = (clock.clone(), dropped.clone());

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, click_rx, shared)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, click_rx, shared)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, click_rx, shared)
            }
            other => return Err(EngineError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        clock.set_running(true);

        log::info!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            clock,
            dropped,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Shared clock advanced by the output stream
    pub fn clock(&self) -> AudioClock {
        self.clock.clone()
    }

    /// Handle on the callback's dropped-click count, with its own report mark
    pub fn dropped_clicks(&self) -> DroppedClicks {
        self.dropped.clone()
    }

    /// Build an output stream for any supported sample type
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut click_rx: ClickConsumer,
        (clock, dropped): (AudioClock, DroppedClicks),
    ) -> EngineResult<Stream>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let mut player = ClickPlayer::new(clock.sample_rate());
        let error_clock = clock.clone();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // ========== SACRED ZONE ==========
                // No allocations, No I/O, No blocking locks
                let buffer_start = clock.current_sample();

                while let Some(event) = click_rx.try_pop() {
                    let start_sample = clock.seconds_to_samples(event.time);
                    if !player.enqueue(event, start_sample) {
                        dropped.record();
                    }
                }

                let mut frames = 0;
                for frame in data.chunks_mut(channels) {
                    // Soft saturation for overlapping clicks
                    let sample = player.next_sample(buffer_start + frames as u64).tanh();
                    for channel_sample in frame.iter_mut() {
                        *channel_sample = T::from_sample(sample);
                    }
                    frames += 1;
                }

                clock.advance(frames);
                // ========== SACRED ZONE END ==========
            },
            move |err| {
                // Runs outside the audio callback, I/O is fine here
                log::error!("Audio stream error: {}", err);
                error_clock.set_running(false);
            },
            None,
        )?;

        Ok(stream)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.clock.set_running(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::metronome::{AccentLevel, ClickEvent};

    #[test]
    fn test_dropped_clicks_reported_once() {
        let mut control = DroppedClicks::new();
        let callback = control.clone();

        assert_eq!(control.report(), 0);
        callback.record();
        callback.record();
        assert_eq!(control.take_unreported(), 2);
        assert_eq!(control.take_unreported(), 0);

        callback.record();
        assert_eq!(control.report(), 1);
        assert_eq!(control.total(), 3);
    }

    #[test]
    fn test_full_player_counts_drops() {
        let mut control = DroppedClicks::new();
        let callback = control.clone();
        let mut player = ClickPlayer::new(48000.0);

        let mut rejected = 0;
        for i in 0..256 {
            let event = ClickEvent::new(0.0, AccentLevel::Beat, 1.0);
            if !player.enqueue(event, i) {
                callback.record();
                rejected += 1;
            }
        }
        assert_eq!(rejected, 256 - ClickPlayer::MAX_PENDING as u64);
        assert_eq!(control.take_unreported(), rejected);
    }
}
