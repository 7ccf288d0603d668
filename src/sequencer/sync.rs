// Sync - Render-loop side of audio/visual synchronization
//
// The render loop never counts frames or timer ticks. Each frame it derives the
// playhead from the audio clock and the last confirmed downbeat (`MeasureSync`),
// so the picture cannot drift from the click track. New sync anchors and new
// measures are double-buffered and only promoted when it is safe: an anchor once
// the clock reaches it, a measure near the start of a beat.

use super::measure::Measure;

/// Anchor of the currently sounding measure: clock time of slot 0 and its tempo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureSync {
    pub start_time: f64,
    pub bpm: f64,
}

impl MeasureSync {
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Seconds since the anchor, never negative
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.start_time).max(0.0)
    }
}

/// Promotion thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncTuning {
    /// Anchors further than this in the future are queued rather than applied
    pub epsilon: f64,
    /// Fraction of a beat at its start during which a measure swap is allowed
    pub swap_window: f64,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            epsilon: 0.020,
            swap_window: 0.1,
        }
    }
}

/// Playhead for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Position within the measure, in [0, 1)
    pub progress: f64,
    /// Note under the playhead
    pub active_note: Option<usize>,
    /// Beat under the playhead
    pub beat_index: Option<u32>,
}

/// A queued anchor becomes active once the clock reaches it
pub fn params_due(next: &MeasureSync, now: f64) -> bool {
    now >= next.start_time
}

/// Position within the current beat, in [0, 1)
pub fn beat_phase(params: &MeasureSync, now: f64) -> f64 {
    let beats = params.elapsed(now) / params.seconds_per_beat();
    beats.fract()
}

/// A queued measure may replace the active one only near the start of a beat
pub fn in_swap_window(phase: f64, swap_window: f64) -> bool {
    phase < swap_window
}

/// Playhead of `measure` anchored at `params`
pub fn measure_progress(params: &MeasureSync, measure: &Measure, now: f64) -> FrameState {
    let beats = measure.time_signature.beats_per_measure as f64;
    let measure_duration = params.seconds_per_beat() * beats;
    let progress = (params.elapsed(now) % measure_duration) / measure_duration;

    let active_note = if measure.notes.is_empty() {
        None
    } else {
        let index = (progress * measure.notes.len() as f64).floor() as usize;
        Some(index.min(measure.notes.len() - 1))
    };
    let last_beat = measure.time_signature.beats_per_measure as u32 - 1;
    let beat_index = ((progress * beats).floor() as u32).min(last_beat);

    FrameState {
        progress,
        active_note,
        beat_index: Some(beat_index),
    }
}

/// Re-anchor so the playhead keeps its beat and in-beat phase under `next`.
///
/// A beat index beyond the new measure's length wraps around it.
pub fn rephase(params: &MeasureSync, current: &Measure, next: &Measure, now: f64) -> MeasureSync {
    let seconds_per_beat = params.seconds_per_beat();
    let beats = params.elapsed(now) / seconds_per_beat;
    let phase = beats.fract();

    let current_beats = current.time_signature.beats_per_measure as u64;
    let next_beats = next.time_signature.beats_per_measure as u64;
    let beat_in_measure = (beats.floor() as u64) % current_beats;
    let beat_in_next = beat_in_measure % next_beats;

    MeasureSync {
        start_time: now - (beat_in_next as f64 + phase) * seconds_per_beat,
        bpm: params.bpm,
    }
}

/// Double-buffered render-loop state
#[derive(Debug, Clone)]
pub struct SyncConsumer {
    tuning: SyncTuning,
    active_params: Option<MeasureSync>,
    next_params: Option<MeasureSync>,
    active_measure: Measure,
    next_measure: Option<Measure>,
}

impl SyncConsumer {
    pub fn new(measure: Measure, tuning: SyncTuning) -> Self {
        Self {
            tuning,
            active_params: None,
            next_params: None,
            active_measure: measure,
            next_measure: None,
        }
    }

    /// Offer a new anchor. Future anchors are queued; current or late ones apply now.
    pub fn submit_sync(&mut self, sync: MeasureSync, now: f64) {
        if sync.start_time > now + self.tuning.epsilon {
            self.next_params = Some(sync);
        } else {
            self.active_params = Some(sync);
            self.next_params = None;
        }
    }

    /// Offer a new measure. While playing it waits for a safe seam; otherwise it swaps now.
    pub fn submit_measure(&mut self, measure: Measure, playing: bool) {
        if !self.active_measure.is_structurally_different(&measure) {
            return;
        }
        if playing {
            self.next_measure = Some(measure);
        } else {
            self.active_measure = measure;
            self.next_measure = None;
        }
    }

    /// Advance one render frame
    pub fn tick(&mut self, now: f64, playing: bool) -> FrameState {
        if !playing {
            if let Some(next) = self.next_params.take() {
                self.active_params = Some(next);
            }
            if let Some(next) = self.next_measure.take() {
                self.active_measure = next;
            }
            return FrameState::default();
        }

        if let Some(next) = self.next_params {
            if params_due(&next, now) {
                self.active_params = Some(next);
                self.next_params = None;
            }
        }

        if self.next_measure.is_some() {
            match self.active_params {
                None => {
                    if let Some(next) = self.next_measure.take() {
                        self.active_measure = next;
                    }
                }
                Some(params) => {
                    if in_swap_window(beat_phase(&params, now), self.tuning.swap_window) {
                        if let Some(next) = self.next_measure.take() {
                            self.active_params =
                                Some(rephase(&params, &self.active_measure, &next, now));
                            self.active_measure = next;
                        }
                    }
                }
            }
        }

        match self.active_params {
            Some(params) => measure_progress(&params, &self.active_measure, now),
            None => FrameState::default(),
        }
    }

    /// Forget all anchors (new run)
    pub fn reset_sync(&mut self) {
        self.active_params = None;
        self.next_params = None;
    }

    pub fn active_measure(&self) -> &Measure {
        &self.active_measure
    }

    pub fn next_measure(&self) -> Option<&Measure> {
        self.next_measure.as_ref()
    }

    pub fn active_params(&self) -> Option<MeasureSync> {
        self.active_params
    }

    pub fn next_params(&self) -> Option<MeasureSync> {
        self.next_params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::measure::MeasureGenerator;
    use crate::sequencer::timeline::{SubdivisionKind, TimeSignature};

    fn four_four() -> Measure {
        MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Sixteenth,
            "single-stroke-roll",
        )
    }

    fn three_four() -> Measure {
        MeasureGenerator::generate(
            TimeSignature::three_four(),
            SubdivisionKind::Eighth,
            "single-stroke-roll",
        )
    }

    #[test]
    fn test_progress_formula() {
        // 120 BPM 4/4: measure = 2s, 16 notes
        let params = MeasureSync {
            start_time: 10.0,
            bpm: 120.0,
        };
        let frame = measure_progress(&params, &four_four(), 10.5);
        assert_eq!(frame.progress, 0.25);
        assert_eq!(frame.active_note, Some(4));
        assert_eq!(frame.beat_index, Some(1));

        // Wraps into the next measure
        let frame = measure_progress(&params, &four_four(), 13.0);
        assert_eq!(frame.progress, 0.5);
        assert_eq!(frame.active_note, Some(8));

        // Before the anchor the playhead rests on slot 0
        let frame = measure_progress(&params, &four_four(), 9.0);
        assert_eq!(frame.progress, 0.0);
        assert_eq!(frame.active_note, Some(0));
    }

    #[test]
    fn test_future_anchor_is_queued() {
        let mut consumer = SyncConsumer::new(four_four(), SyncTuning::default());
        let sync = MeasureSync {
            start_time: 1.1,
            bpm: 120.0,
        };
        consumer.submit_sync(sync, 1.0);
        assert_eq!(consumer.active_params(), None);
        assert_eq!(consumer.next_params(), Some(sync));

        consumer.tick(1.05, true);
        assert_eq!(consumer.active_params(), None);

        consumer.tick(1.1, true);
        assert_eq!(consumer.active_params(), Some(sync));
        assert_eq!(consumer.next_params(), None);
    }

    #[test]
    fn test_near_or_late_anchor_applies_immediately() {
        let mut consumer = SyncConsumer::new(four_four(), SyncTuning::default());
        let near = MeasureSync {
            start_time: 1.01,
            bpm: 100.0,
        };
        consumer.submit_sync(near, 1.0);
        assert_eq!(consumer.active_params(), Some(near));

        let late = MeasureSync {
            start_time: 0.5,
            bpm: 100.0,
        };
        consumer.submit_sync(late, 1.0);
        assert_eq!(consumer.active_params(), Some(late));
    }

    #[test]
    fn test_measure_swap_waits_for_beat_start() {
        let mut consumer = SyncConsumer::new(four_four(), SyncTuning::default());
        consumer.submit_sync(
            MeasureSync {
                start_time: 0.0,
                bpm: 120.0,
            },
            0.0,
        );
        let next = three_four();
        let next_id = next.id;
        consumer.submit_measure(next, true);

        // Halfway through beat 2 (phase 0.5): not yet
        consumer.tick(0.75, true);
        assert!(consumer.next_measure().is_some());

        // Start of beat 3 (phase 0.02): swap, keeping beat 3 at its phase
        let frame = consumer.tick(1.01, true);
        assert!(consumer.next_measure().is_none());
        assert_eq!(consumer.active_measure().id, next_id);
        assert_eq!(frame.beat_index, Some(2));
        let anchor = consumer.active_params().unwrap();
        assert!((anchor.start_time - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_rephase_wraps_beat_into_shorter_measure() {
        let params = MeasureSync {
            start_time: 0.0,
            bpm: 60.0,
        };
        // Beat 4 (index 3) of 4/4 at phase 0.05 -> beat index 0 of 3/4
        let anchor = rephase(&params, &four_four(), &three_four(), 3.05);
        assert!((anchor.start_time - 3.0).abs() < 1e-9);
        assert_eq!(anchor.bpm, 60.0);
    }

    #[test]
    fn test_identical_measure_is_ignored() {
        let measure = four_four();
        let mut consumer = SyncConsumer::new(measure.clone(), SyncTuning::default());
        consumer.submit_measure(measure, true);
        assert!(consumer.next_measure().is_none());
    }

    #[test]
    fn test_stopped_tick_applies_queued_swaps() {
        let mut consumer = SyncConsumer::new(four_four(), SyncTuning::default());
        let next = three_four();
        let next_id = next.id;
        consumer.submit_measure(next, true);
        consumer.submit_sync(
            MeasureSync {
                start_time: 5.0,
                bpm: 90.0,
            },
            0.0,
        );

        let frame = consumer.tick(0.0, false);
        assert_eq!(frame, FrameState::default());
        assert_eq!(frame.active_note, None);
        assert_eq!(consumer.active_measure().id, next_id);
        assert_eq!(consumer.active_params().map(|p| p.bpm), Some(90.0));
    }

    #[test]
    fn test_measure_swaps_immediately_without_anchor() {
        let mut consumer = SyncConsumer::new(four_four(), SyncTuning::default());
        let next = three_four();
        let next_id = next.id;
        consumer.submit_measure(next, true);
        let frame = consumer.tick(0.3, true);
        assert_eq!(consumer.active_measure().id, next_id);
        assert_eq!(frame.active_note, None);
    }
}
