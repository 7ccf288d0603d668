// Scheduler - Lookahead click scheduling against the audio clock
//
// Two clocks are involved. A coarse periodic pass (the lookahead timer) only
// decides *when to queue* clicks; every click carries an exact timestamp on the
// authoritative `Clock`, which decides *when it sounds*. Tempo, grid and meter
// changes requested while playing are parked in `PendingChanges` and resolved
// slot by slot in `step_slot`, a pure transition function.

use super::metronome::{AccentLevel, ClickEvent};
use super::timeline::{SubdivisionKind, Tempo, TimeSignature};
use super::transport::TransportState;
use crate::audio::timing::Clock;
use serde::{Deserialize, Serialize};

/// Scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Audio clock is not running; start the output stream first")]
    ClockUnavailable,
}

/// When a tempo change requested during playback takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TempoChangePolicy {
    /// At the next beat boundary
    #[default]
    NextBeat,
    /// At the next downbeat, together with grid and meter changes
    NextMeasure,
}

/// Receiver for scheduled clicks
pub trait ClickSink {
    fn schedule(&mut self, event: ClickEvent);
}

impl ClickSink for Vec<ClickEvent> {
    fn schedule(&mut self, event: ClickEvent) {
        self.push(event);
    }
}

/// Notification delivered once per beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEvent {
    /// Beat within the measure, 0 is the downbeat
    pub beat_index: u32,
    /// Clock time at which the beat sounds
    pub scheduled_time: f64,
    /// Active tempo at that time
    pub bpm: f64,
}

/// Sole sink for boundary notifications. Runs on the lookahead timer's thread.
pub type BoundaryCallback = Box<dyn FnMut(BoundaryEvent) + Send>;

/// Active audio configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub tempo: Tempo,
    pub audio_subdivision: SubdivisionKind,
    pub time_signature: TimeSignature,
    /// Position in the slot grid; reset to 0 on every downbeat
    pub slot_counter: u32,
}

impl SchedulerConfig {
    pub fn slots_per_beat(&self) -> u32 {
        self.audio_subdivision.slots_per_beat(&self.time_signature)
    }

    pub fn total_slots(&self) -> u32 {
        self.audio_subdivision.total_slots(&self.time_signature)
    }

    pub fn seconds_per_slot(&self) -> f64 {
        self.tempo
            .slot_duration_seconds(self.audio_subdivision, &self.time_signature)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tempo: Tempo::default(),
            audio_subdivision: SubdivisionKind::Quarter,
            time_signature: TimeSignature::four_four(),
            slot_counter: 0,
        }
    }
}

/// Changes waiting for a boundary. One value per field; a later write replaces an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingChanges {
    pub bpm: Option<Tempo>,
    pub bpm_applies_at_beat: bool,
    pub audio_subdivision: Option<SubdivisionKind>,
    pub time_signature: Option<TimeSignature>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.bpm.is_none() && self.audio_subdivision.is_none() && self.time_signature.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Grid position of one slot under a given configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMetadata {
    pub slots_per_beat: u32,
    pub total_slots: u32,
    pub slot_index: u32,
    pub is_beat: bool,
    pub is_downbeat: bool,
    pub beat_index: u32,
}

impl SlotMetadata {
    pub fn compute(config: &SchedulerConfig) -> Self {
        let slots_per_beat = config.slots_per_beat();
        let total_slots = config.total_slots();
        let slot_index = config.slot_counter % total_slots;
        Self {
            slots_per_beat,
            total_slots,
            slot_index,
            is_beat: slot_index % slots_per_beat == 0,
            is_downbeat: slot_index == 0,
            beat_index: slot_index / slots_per_beat,
        }
    }

    pub fn accent(&self) -> AccentLevel {
        if self.is_downbeat {
            AccentLevel::Downbeat
        } else if self.is_beat {
            AccentLevel::Beat
        } else {
            AccentLevel::Offbeat
        }
    }
}

/// Outcome of scheduling one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStep {
    /// Configuration for the following slot (counter already advanced)
    pub config: SchedulerConfig,
    /// Pending changes still waiting after this slot
    pub pending: PendingChanges,
    /// Metadata of this slot under the configuration it sounded with
    pub slot: SlotMetadata,
    pub click: ClickEvent,
    pub boundary: Option<BoundaryEvent>,
    /// Time until the following slot
    pub slot_duration: f64,
}

/// Resolve pending changes for the slot at `time` and describe what it emits.
///
/// Boundary detection uses the grid that was active *before* this slot, so a
/// meter change can never make one slot look like two different downbeats.
/// Tempo may change on any beat; grid and meter only on a downbeat, where the
/// slot counter restarts at 0.
pub fn step_slot(
    config: SchedulerConfig,
    pending: PendingChanges,
    time: f64,
    volume: f32,
) -> SlotStep {
    let mut config = config;
    let mut pending = pending;

    let before = SlotMetadata::compute(&config);

    if before.is_beat && config.slot_counter > 0 && pending.bpm_applies_at_beat {
        if let Some(tempo) = pending.bpm.take() {
            config.tempo = tempo;
            pending.bpm_applies_at_beat = false;
        }
    }

    if config.slot_counter > 0 && before.is_downbeat {
        if let Some(subdivision) = pending.audio_subdivision.take() {
            config.audio_subdivision = subdivision;
        }
        if let Some(time_signature) = pending.time_signature.take() {
            config.time_signature = time_signature;
        }
        if let Some(tempo) = pending.bpm.take() {
            config.tempo = tempo;
            pending.bpm_applies_at_beat = false;
        }
        config.slot_counter = 0;
    }

    let slot = SlotMetadata::compute(&config);
    let click = ClickEvent::new(time, slot.accent(), volume);
    let boundary = slot.is_beat.then(|| BoundaryEvent {
        beat_index: slot.beat_index,
        scheduled_time: time,
        bpm: config.tempo.bpm(),
    });
    let slot_duration = config.seconds_per_slot();

    config.slot_counter += 1;

    SlotStep {
        config,
        pending,
        slot,
        click,
        boundary,
        slot_duration,
    }
}

/// Period and window of the lookahead loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerTiming {
    /// How often the lookahead pass runs
    pub lookahead_interval: f64,
    /// How far ahead of the clock clicks are queued
    pub schedule_ahead: f64,
    /// Delay between `start()` and the first click
    pub start_latency: f64,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            lookahead_interval: 0.025,
            schedule_ahead: 0.100,
            start_latency: 0.100,
        }
    }
}

/// Lookahead click scheduler
///
/// Runs cooperatively: the owner calls `poll()` from its loop and the scheduler
/// performs a lookahead pass whenever its timer has come due, re-arming itself
/// afterwards. `stop()` disarms the timer.
pub struct AudioScheduler<C: Clock, S: ClickSink> {
    clock: C,
    sink: S,
    timing: SchedulerTiming,
    state: TransportState,
    config: SchedulerConfig,
    pending: PendingChanges,
    volume: f32,
    tempo_policy: TempoChangePolicy,
    start_time: f64,
    next_event_time: f64,
    /// Next due time of the lookahead timer, `None` while disarmed
    next_pass_at: Option<f64>,
    on_boundary: Option<BoundaryCallback>,
}

impl<C: Clock, S: ClickSink> AudioScheduler<C, S> {
    /// Create a stopped scheduler
    pub fn new(clock: C, sink: S, timing: SchedulerTiming) -> Self {
        Self {
            clock,
            sink,
            timing,
            state: TransportState::Stopped,
            config: SchedulerConfig::default(),
            pending: PendingChanges::default(),
            volume: 0.7,
            tempo_policy: TempoChangePolicy::default(),
            start_time: 0.0,
            next_event_time: 0.0,
            next_pass_at: None,
            on_boundary: None,
        }
    }

    /// Set tempo. Applied now while stopped; parked until the next boundary while playing.
    pub fn set_bpm(&mut self, bpm: f64) {
        let tempo = Tempo::new(bpm);
        if self.state.is_playing() {
            self.pending.bpm = Some(tempo);
            self.pending.bpm_applies_at_beat = self.tempo_policy == TempoChangePolicy::NextBeat;
            log::debug!("Pending tempo {} ({:?})", tempo, self.tempo_policy);
        } else {
            self.config.tempo = tempo;
            self.pending.bpm = None;
            self.pending.bpm_applies_at_beat = false;
        }
    }

    /// Set the click grid. Parked until the next downbeat while playing.
    pub fn set_audio_subdivision(&mut self, subdivision: SubdivisionKind) {
        if self.state.is_playing() {
            self.pending.audio_subdivision = Some(subdivision);
            log::debug!("Pending audio subdivision {}", subdivision.label());
        } else {
            self.config.audio_subdivision = subdivision;
            self.pending.audio_subdivision = None;
        }
    }

    /// Set the meter. Parked until the next downbeat while playing.
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        if self.state.is_playing() {
            self.pending.time_signature = Some(time_signature);
            log::debug!("Pending time signature {}", time_signature);
        } else {
            self.config.time_signature = time_signature;
            self.pending.time_signature = None;
        }
    }

    /// Set click volume (0.0 to 1.0). Only clicks scheduled afterwards are affected.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    /// Also re-targets a tempo change that is still pending
    pub fn set_tempo_change_policy(&mut self, policy: TempoChangePolicy) {
        self.tempo_policy = policy;
        if self.pending.bpm.is_some() {
            self.pending.bpm_applies_at_beat = policy == TempoChangePolicy::NextBeat;
        }
    }

    /// Start playback and register `on_boundary` as the boundary sink.
    ///
    /// A no-op while already playing. Refuses to start on an unavailable clock.
    pub fn start(&mut self, on_boundary: BoundaryCallback) -> Result<(), SchedulerError> {
        if self.state.is_playing() {
            return Ok(());
        }
        if !self.clock.is_available() {
            return Err(SchedulerError::ClockUnavailable);
        }

        let now = self.clock.now();
        self.config.slot_counter = 0;
        self.pending.clear();
        self.start_time = now + self.timing.start_latency;
        self.next_event_time = self.start_time;
        self.on_boundary = Some(on_boundary);
        self.state = TransportState::Playing;
        log::debug!(
            "Scheduler started at {:.3}s: {} {} {}",
            self.start_time,
            self.config.tempo,
            self.config.time_signature,
            self.config.audio_subdivision.label()
        );

        self.run_lookahead();
        self.next_pass_at = Some(now + self.timing.lookahead_interval);
        Ok(())
    }

    /// Stop playback and disarm the lookahead timer. A no-op while stopped.
    pub fn stop(&mut self) {
        if self.state.is_stopped() {
            return;
        }
        self.state = TransportState::Stopped;
        self.next_pass_at = None;
        self.on_boundary = None;
        log::debug!("Scheduler stopped at {:.3}s", self.clock.now());
    }

    /// Run the lookahead pass if the timer is due, then re-arm it.
    /// Returns the number of slots scheduled.
    pub fn poll(&mut self) -> usize {
        let Some(due) = self.next_pass_at else {
            return 0;
        };
        let now = self.clock.now();
        if now < due {
            return 0;
        }
        let scheduled = self.run_lookahead();
        if self.state.is_playing() {
            self.next_pass_at = Some(now + self.timing.lookahead_interval);
        }
        scheduled
    }

    /// Queue every slot that falls inside the lookahead window.
    /// Returns the number of slots scheduled.
    pub fn run_lookahead(&mut self) -> usize {
        if !self.state.is_playing() {
            return 0;
        }
        let horizon = self.clock.now() + self.timing.schedule_ahead;
        let mut scheduled = 0;
        while self.next_event_time < horizon {
            self.schedule_slot(self.next_event_time);
            scheduled += 1;
        }
        scheduled
    }

    fn schedule_slot(&mut self, time: f64) {
        let previous = self.config;
        let step = step_slot(self.config, self.pending, time, self.volume);

        if step.config.tempo != previous.tempo {
            log::debug!("Tempo {} -> {} at {:.3}s", previous.tempo, step.config.tempo, time);
        }
        if step.config.time_signature != previous.time_signature
            || step.config.audio_subdivision != previous.audio_subdivision
        {
            log::debug!(
                "Grid {} {} -> {} {} at {:.3}s",
                previous.time_signature,
                previous.audio_subdivision.label(),
                step.config.time_signature,
                step.config.audio_subdivision.label(),
                time
            );
        }
        log::trace!(
            "Slot {} at {:.4}s ({:?})",
            step.slot.slot_index,
            time,
            step.click.accent
        );

        self.config = step.config;
        self.pending = step.pending;

        self.sink.schedule(step.click);
        if let Some(boundary) = step.boundary {
            if let Some(callback) = self.on_boundary.as_mut() {
                callback(boundary);
            }
        }

        self.next_event_time += step.slot_duration;
    }

    /// Authoritative clock time, same basis as click timestamps
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Currently active configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Tempo that will be active once pending changes land.
    /// Pending values left over from a stopped run never land.
    pub fn target_bpm(&self) -> f64 {
        match self.pending.bpm {
            Some(tempo) if self.state.is_playing() => tempo.bpm(),
            _ => self.config.tempo.bpm(),
        }
    }

    /// Click grid that will be active once pending changes land
    pub fn target_audio_subdivision(&self) -> SubdivisionKind {
        match self.pending.audio_subdivision {
            Some(subdivision) if self.state.is_playing() => subdivision,
            _ => self.config.audio_subdivision,
        }
    }

    /// Meter that will be active once pending changes land
    pub fn target_time_signature(&self) -> TimeSignature {
        match self.pending.time_signature {
            Some(time_signature) if self.state.is_playing() => time_signature,
            _ => self.config.time_signature,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn tempo_change_policy(&self) -> TempoChangePolicy {
        self.tempo_policy
    }

    /// Clock time of the first click of the current run
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Clock time of the next slot to be queued
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Due time of the lookahead timer, `None` while disarmed
    pub fn next_pass_at(&self) -> Option<f64> {
        self.next_pass_at
    }

    pub fn timing(&self) -> &SchedulerTiming {
        &self.timing
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::timing::ManualClock;

    fn config(bpm: f64, subdivision: SubdivisionKind, ts: TimeSignature) -> SchedulerConfig {
        SchedulerConfig {
            tempo: Tempo::new(bpm),
            audio_subdivision: subdivision,
            time_signature: ts,
            slot_counter: 0,
        }
    }

    #[test]
    fn test_slot_metadata() {
        let mut cfg = config(120.0, SubdivisionKind::Sixteenth, TimeSignature::four_four());
        let meta = SlotMetadata::compute(&cfg);
        assert!(meta.is_downbeat && meta.is_beat);
        assert_eq!(meta.accent(), AccentLevel::Downbeat);

        cfg.slot_counter = 5;
        let meta = SlotMetadata::compute(&cfg);
        assert!(!meta.is_beat);
        assert_eq!(meta.beat_index, 1);
        assert_eq!(meta.accent(), AccentLevel::Offbeat);

        cfg.slot_counter = 8;
        let meta = SlotMetadata::compute(&cfg);
        assert!(meta.is_beat && !meta.is_downbeat);
        assert_eq!(meta.beat_index, 2);
        assert_eq!(meta.accent(), AccentLevel::Beat);
    }

    #[test]
    fn test_step_advances_counter_and_reports_duration() {
        let cfg = config(120.0, SubdivisionKind::Sixteenth, TimeSignature::four_four());
        let step = step_slot(cfg, PendingChanges::default(), 1.0, 1.0);
        assert_eq!(step.config.slot_counter, 1);
        assert_eq!(step.slot_duration, 0.125);
        assert_eq!(step.click.time, 1.0);
        assert_eq!(
            step.boundary,
            Some(BoundaryEvent {
                beat_index: 0,
                scheduled_time: 1.0,
                bpm: 120.0
            })
        );
    }

    #[test]
    fn test_offbeat_emits_no_boundary() {
        let mut cfg = config(120.0, SubdivisionKind::Eighth, TimeSignature::four_four());
        cfg.slot_counter = 3;
        let step = step_slot(cfg, PendingChanges::default(), 0.0, 1.0);
        assert!(step.boundary.is_none());
        assert_eq!(step.click.accent, AccentLevel::Offbeat);
    }

    #[test]
    fn test_beat_flagged_tempo_applies_on_next_beat() {
        let mut cfg = config(120.0, SubdivisionKind::Eighth, TimeSignature::four_four());
        let pending = PendingChanges {
            bpm: Some(Tempo::new(60.0)),
            bpm_applies_at_beat: true,
            ..Default::default()
        };

        // Offbeat: nothing happens
        cfg.slot_counter = 1;
        let step = step_slot(cfg, pending, 0.0, 1.0);
        assert_eq!(step.config.tempo.bpm(), 120.0);
        assert_eq!(step.pending, pending);

        // Beat 2: tempo lands, slot already uses it
        let step = step_slot(step.config, step.pending, 0.25, 1.0);
        assert_eq!(step.config.tempo.bpm(), 60.0);
        assert_eq!(step.slot_duration, 0.5);
        assert_eq!(step.boundary.map(|b| b.bpm), Some(60.0));
        assert!(step.pending.is_empty());
        assert!(!step.pending.bpm_applies_at_beat);
    }

    #[test]
    fn test_measure_flagged_tempo_waits_for_downbeat() {
        let mut cfg = config(120.0, SubdivisionKind::Quarter, TimeSignature::four_four());
        let pending = PendingChanges {
            bpm: Some(Tempo::new(90.0)),
            bpm_applies_at_beat: false,
            ..Default::default()
        };

        cfg.slot_counter = 2;
        let step = step_slot(cfg, pending, 0.0, 1.0);
        assert_eq!(step.config.tempo.bpm(), 120.0);

        let step = step_slot(step.config, step.pending, 0.5, 1.0);
        assert_eq!(step.config.tempo.bpm(), 120.0);

        // Counter is now 4 == total slots: downbeat
        let step = step_slot(step.config, step.pending, 1.0, 1.0);
        assert_eq!(step.config.tempo.bpm(), 90.0);
        assert!(step.slot.is_downbeat);
        assert_eq!(step.config.slot_counter, 1);
    }

    #[test]
    fn test_meter_change_applies_only_at_old_downbeat() {
        let mut cfg = config(120.0, SubdivisionKind::Quarter, TimeSignature::four_four());
        let pending = PendingChanges {
            time_signature: Some(TimeSignature::three_four()),
            ..Default::default()
        };

        // Slot 3 of 4/4 would be a downbeat under 3/4, but the old grid decides
        cfg.slot_counter = 3;
        let step = step_slot(cfg, pending, 0.0, 1.0);
        assert_eq!(step.config.time_signature, TimeSignature::four_four());
        assert_eq!(step.slot.beat_index, 3);
        assert_eq!(step.pending.time_signature, Some(TimeSignature::three_four()));

        let step = step_slot(step.config, step.pending, 0.5, 1.0);
        assert_eq!(step.config.time_signature, TimeSignature::three_four());
        assert!(step.slot.is_downbeat);
        assert_eq!(step.slot.total_slots, 3);
        assert!(step.pending.is_empty());
    }

    #[test]
    fn test_first_slot_does_not_apply_pending() {
        let cfg = config(120.0, SubdivisionKind::Quarter, TimeSignature::four_four());
        let pending = PendingChanges {
            bpm: Some(Tempo::new(80.0)),
            bpm_applies_at_beat: true,
            audio_subdivision: Some(SubdivisionKind::Eighth),
            ..Default::default()
        };
        let step = step_slot(cfg, pending, 0.0, 1.0);
        assert_eq!(step.config.tempo.bpm(), 120.0);
        assert_eq!(step.config.audio_subdivision, SubdivisionKind::Quarter);
        assert_eq!(step.pending, pending);
    }

    #[test]
    fn test_setters_apply_immediately_when_stopped() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = AudioScheduler::new(clock, Vec::new(), SchedulerTiming::default());

        scheduler.set_bpm(300.0);
        scheduler.set_time_signature(TimeSignature::six_eight());
        scheduler.set_audio_subdivision(SubdivisionKind::Triplet);
        scheduler.set_volume(-2.0);

        assert_eq!(scheduler.config().tempo.bpm(), 240.0);
        assert_eq!(scheduler.config().time_signature, TimeSignature::six_eight());
        assert_eq!(scheduler.config().audio_subdivision, SubdivisionKind::Triplet);
        assert_eq!(scheduler.volume(), 0.0);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn test_pending_is_last_write_wins() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = AudioScheduler::new(clock, Vec::new(), SchedulerTiming::default());
        scheduler.start(Box::new(|_: BoundaryEvent| {})).unwrap();

        scheduler.set_bpm(100.0);
        scheduler.set_bpm(140.0);
        assert_eq!(scheduler.pending().bpm, Some(Tempo::new(140.0)));
        assert_eq!(scheduler.target_bpm(), 140.0);
        assert_eq!(scheduler.config().tempo.bpm(), 120.0);
    }

    #[test]
    fn test_policy_change_retargets_pending_tempo() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = AudioScheduler::new(clock, Vec::new(), SchedulerTiming::default());
        scheduler.start(Box::new(|_: BoundaryEvent| {})).unwrap();

        scheduler.set_bpm(150.0);
        assert!(scheduler.pending().bpm_applies_at_beat);

        scheduler.set_tempo_change_policy(TempoChangePolicy::NextMeasure);
        assert!(!scheduler.pending().bpm_applies_at_beat);
        assert_eq!(scheduler.pending().bpm, Some(Tempo::new(150.0)));

        scheduler.set_tempo_change_policy(TempoChangePolicy::NextBeat);
        assert!(scheduler.pending().bpm_applies_at_beat);
    }

    #[test]
    fn test_policy_change_without_pending_tempo_keeps_flag_clear() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = AudioScheduler::new(clock, Vec::new(), SchedulerTiming::default());
        scheduler.start(Box::new(|_: BoundaryEvent| {})).unwrap();

        scheduler.set_tempo_change_policy(TempoChangePolicy::NextBeat);
        assert!(!scheduler.pending().bpm_applies_at_beat);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn test_targets_ignore_pending_left_by_stop() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = AudioScheduler::new(clock, Vec::new(), SchedulerTiming::default());
        scheduler.start(Box::new(|_: BoundaryEvent| {})).unwrap();

        scheduler.set_bpm(150.0);
        scheduler.set_audio_subdivision(SubdivisionKind::Eighth);
        scheduler.set_time_signature(TimeSignature::three_four());
        assert_eq!(scheduler.target_bpm(), 150.0);
        assert_eq!(scheduler.target_audio_subdivision(), SubdivisionKind::Eighth);
        assert_eq!(scheduler.target_time_signature(), TimeSignature::three_four());

        scheduler.stop();
        assert_eq!(scheduler.target_bpm(), 120.0);
        assert_eq!(scheduler.target_audio_subdivision(), SubdivisionKind::Quarter);
        assert_eq!(scheduler.target_time_signature(), TimeSignature::four_four());
    }

    #[test]
    fn test_poll_waits_for_timer() {
        let clock = ManualClock::new(0.0);
        let mut scheduler =
            AudioScheduler::new(clock.clone(), Vec::new(), SchedulerTiming::default());
        scheduler.start(Box::new(|_: BoundaryEvent| {})).unwrap();
        assert_eq!(scheduler.next_pass_at(), Some(0.025));

        clock.set(0.01);
        assert_eq!(scheduler.poll(), 0);

        clock.set(0.5);
        assert!(scheduler.poll() > 0);
        let next = scheduler.next_pass_at().unwrap();
        assert!((next - 0.525).abs() < 1e-12);

        scheduler.stop();
        assert_eq!(scheduler.next_pass_at(), None);
        clock.set(5.0);
        assert_eq!(scheduler.poll(), 0);
    }
}
