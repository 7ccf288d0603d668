// Metronome - Click timbres and sample-accurate click playback
// Scheduled clicks arrive with clock timestamps; the player starts each one on its exact sample

use std::f32::consts::PI;

/// Metronome click accent level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentLevel {
    /// First slot of the measure
    Downbeat,
    /// Start of any other beat
    Beat,
    /// Subdivided position between beats
    Offbeat,
}

/// Timbre of one click: pitch, peak level and decay time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickVoice {
    pub frequency: f32,
    pub amplitude: f32,
    pub decay_seconds: f32,
}

impl AccentLevel {
    /// Downbeat is loudest, highest and longest; offbeats quietest and shortest
    pub fn voice(self) -> ClickVoice {
        match self {
            AccentLevel::Downbeat => ClickVoice {
                frequency: 1600.0,
                amplitude: 1.0,
                decay_seconds: 0.060,
            },
            AccentLevel::Beat => ClickVoice {
                frequency: 1000.0,
                amplitude: 0.7,
                decay_seconds: 0.040,
            },
            AccentLevel::Offbeat => ClickVoice {
                frequency: 800.0,
                amplitude: 0.35,
                decay_seconds: 0.020,
            },
        }
    }
}

/// An audible event at an absolute clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Clock timestamp in seconds
    pub time: f64,
    pub accent: AccentLevel,
    pub frequency: f32,
    /// Peak amplitude, already scaled by the volume at scheduling time
    pub amplitude: f32,
    pub decay_seconds: f32,
}

impl ClickEvent {
    pub fn new(time: f64, accent: AccentLevel, volume: f32) -> Self {
        let voice = accent.voice();
        Self {
            time,
            accent,
            frequency: voice.frequency,
            amplitude: voice.amplitude * volume.clamp(0.0, 1.0),
            decay_seconds: voice.decay_seconds,
        }
    }
}

/// A click currently sounding
#[derive(Debug, Clone, Copy)]
struct ActiveClick {
    phase: f32,
    phase_increment: f32,
    envelope: f32,
    decay_coefficient: f32,
    remaining: usize,
}

impl ActiveClick {
    fn new(event: &ClickEvent, sample_rate: f32) -> Self {
        let length = ((event.decay_seconds * sample_rate) as usize).max(1);
        Self {
            phase: 0.0,
            phase_increment: 2.0 * PI * event.frequency / sample_rate,
            envelope: event.amplitude,
            // Exponential decay reaching e^-8 at the end of the click
            decay_coefficient: (-8.0 / length as f32).exp(),
            remaining: length,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let sample = self.phase.sin() * self.envelope;
        self.phase += self.phase_increment;
        if self.phase > 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        self.envelope *= self.decay_coefficient;
        self.remaining -= 1;
        sample
    }
}

/// Real-time click renderer.
/// All storage is allocated up front; `enqueue` and `next_sample` never allocate.
#[derive(Debug, Clone)]
pub struct ClickPlayer {
    sample_rate: f32,
    /// Events waiting for their start sample
    pending: Vec<(u64, ClickEvent)>,
    voices: Vec<ActiveClick>,
}

impl ClickPlayer {
    pub const MAX_PENDING: usize = 64;
    pub const MAX_VOICES: usize = 16;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            pending: Vec::with_capacity(Self::MAX_PENDING),
            voices: Vec::with_capacity(Self::MAX_VOICES),
        }
    }

    /// Queue a click to start at an absolute sample index.
    /// Returns false when the queue is full and the click was dropped.
    pub fn enqueue(&mut self, event: ClickEvent, start_sample: u64) -> bool {
        if self.pending.len() >= Self::MAX_PENDING {
            return false;
        }
        self.pending.push((start_sample, event));
        true
    }

    /// Render the sample at absolute index `sample_index`.
    /// Clicks whose start sample has passed (late arrivals) start immediately.
    pub fn next_sample(&mut self, sample_index: u64) -> f32 {
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= sample_index {
                let (_, event) = self.pending.swap_remove(i);
                if self.voices.len() >= Self::MAX_VOICES {
                    // Steal the oldest voice
                    self.voices.remove(0);
                }
                self.voices.push(ActiveClick::new(&event, self.sample_rate));
            } else {
                i += 1;
            }
        }

        let mut output = 0.0;
        for voice in self.voices.iter_mut() {
            output += voice.next_sample();
        }
        self.voices.retain(|voice| voice.remaining > 0);
        output
    }

    /// Render a mono buffer starting at absolute index `buffer_start`
    pub fn process_buffer(&mut self, buffer_start: u64, output: &mut [f32]) {
        for (offset, sample) in output.iter_mut().enumerate() {
            *sample = self.next_sample(buffer_start + offset as u64);
        }
    }

    /// Number of clicks currently sounding
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Drop every queued and sounding click
    pub fn reset(&mut self) {
        self.pending.clear();
        self.voices.clear();
    }
}
