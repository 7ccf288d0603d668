// Audio timing - The authoritative playback clock
//
// Every scheduled click and every rendered frame reads time from the same
// `Clock`. On a live system that is `AudioClock`, advanced by the output
// callback one buffer at a time, so event timestamps and the sound card agree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Source of the authoritative time, in seconds
pub trait Clock {
    /// Current time in seconds
    fn now(&self) -> f64;

    /// Whether the clock is running and safe to schedule against
    fn is_available(&self) -> bool {
        true
    }
}

/// Sample-counting clock shared with the audio callback
#[derive(Debug, Clone)]
pub struct AudioClock {
    /// Frames rendered so far (incremented by audio callback)
    sample_position: Arc<AtomicU64>,
    /// Set once the output stream is playing
    running: Arc<AtomicBool>,
    sample_rate: f64,
}

impl AudioClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Get current sample position
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Acquire)
    }

    /// Advance sample position (called from audio callback)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Release);
    }

    /// Mark the clock as running or halted
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Convert a clock timestamp to an absolute sample index
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate).round() as u64
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}

impl Clock for AudioClock {
    fn now(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }

    fn is_available(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Hand-driven clock for tests, benchmarks and dry runs
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_seconds: f64) -> Self {
        Self {
            seconds_bits: Arc::new(AtomicU64::new(start_seconds.to_bits())),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.seconds_bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds_bits.load(Ordering::Relaxed))
    }
}
