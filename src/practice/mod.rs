// Practice session - Wires scheduler, generator and render-loop sync together
//
// Two loops share a session. `poll()` is the lookahead timer's tick and runs on
// its own thread (`LookaheadTimer`), so clicks keep being queued while the
// window is hidden. `frame()` is the render tick: it hands beat boundaries over
// as `MeasureSync` anchors and asks the `SyncConsumer` for the playhead.

pub mod summary;
pub mod timer;

pub use summary::{ScoreRecorder, SessionSummary};
pub use timer::{LookaheadTimer, SharedSession};

use crate::audio::timing::Clock;
use crate::config::MetronomeConfig;
use crate::messaging::command::Command;
use crate::sequencer::measure::{Measure, MeasureGenerator};
use crate::sequencer::rudiment::{PatternLibrary, Rudiment};
use crate::sequencer::scheduler::{
    AudioScheduler, BoundaryCallback, BoundaryEvent, ClickSink, SchedulerError, TempoChangePolicy,
};
use crate::sequencer::sync::{FrameState, MeasureSync, SyncConsumer, SyncTuning};
use crate::sequencer::timeline::{SubdivisionKind, TimeSignature};
use std::sync::{Arc, Mutex};

/// Anchor waiting in the mailbox
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSync {
    sync: MeasureSync,
    /// Clock time before which the anchor must not be handed over
    due_at: Option<f64>,
}

/// Written by the boundary callback on the timer thread, read by the render tick
#[derive(Debug, Default)]
struct BoundaryMailbox {
    /// Newest anchor not yet handed to the consumer
    pending: Option<PendingSync>,
    /// Last anchor produced, to detect tempo changes between downbeats
    anchor: Option<MeasureSync>,
    last_beat: Option<BoundaryEvent>,
}

impl BoundaryMailbox {
    /// Downbeats anchor a new measure. A beat whose tempo differs from the
    /// current anchor re-anchors the same measure so the playhead follows the
    /// new tempo from that beat on.
    fn receive(&mut self, event: BoundaryEvent) {
        let tempo_changed = self.anchor.is_some_and(|anchor| anchor.bpm != event.bpm);
        if event.beat_index == 0 {
            let sync = MeasureSync {
                start_time: event.scheduled_time,
                bpm: event.bpm,
            };
            self.anchor = Some(sync);
            self.pending = Some(PendingSync { sync, due_at: None });
        } else if tempo_changed {
            // Start time lies in the past; hold it until its beat sounds
            let sync = MeasureSync {
                start_time: event.scheduled_time - event.beat_index as f64 * 60.0 / event.bpm,
                bpm: event.bpm,
            };
            self.anchor = Some(sync);
            self.pending = Some(PendingSync {
                sync,
                due_at: Some(event.scheduled_time),
            });
        }
        self.last_beat = Some(event);
    }

    /// Take the waiting anchor if it may be handed over at `now`
    fn take_due(&mut self, now: f64) -> Option<MeasureSync> {
        let pending = self.pending?;
        if pending.due_at.is_some_and(|due_at| now < due_at) {
            return None;
        }
        self.pending = None;
        Some(pending.sync)
    }
}

/// One practice run's worth of engine state
pub struct PracticeSession<C: Clock, S: ClickSink> {
    scheduler: AudioScheduler<C, S>,
    consumer: SyncConsumer,
    mailbox: Arc<Mutex<BoundaryMailbox>>,
    visual_time_signature: TimeSignature,
    visual_subdivision: SubdivisionKind,
    rudiment: &'static Rudiment,
    measure: Measure,
    recorder: Option<Box<dyn ScoreRecorder + Send>>,
    last_frame: FrameState,
}

impl<C: Clock, S: ClickSink> PracticeSession<C, S> {
    /// Build a stopped session from user settings
    pub fn new(clock: C, sink: S, config: &MetronomeConfig) -> Self {
        let config = config.clone().sanitized();
        let time_signature = config.time_signature();

        let mut scheduler = AudioScheduler::new(clock, sink, config.timing.scheduler_timing());
        scheduler.set_bpm(config.bpm);
        scheduler.set_time_signature(time_signature);
        scheduler.set_audio_subdivision(visual_grid(config.audio_subdivision, &time_signature));
        scheduler.set_volume(config.volume);
        scheduler.set_tempo_change_policy(config.tempo_change);

        let rudiment = PatternLibrary::get_or_default(&config.rudiment_id);
        let measure = MeasureGenerator::generate(
            time_signature,
            visual_grid(config.visual_subdivision, &time_signature),
            rudiment.id,
        );
        let tuning: SyncTuning = config.timing.sync_tuning();

        Self {
            scheduler,
            consumer: SyncConsumer::new(measure.clone(), tuning),
            mailbox: Arc::new(Mutex::new(BoundaryMailbox::default())),
            visual_time_signature: time_signature,
            visual_subdivision: config.visual_subdivision,
            rudiment,
            measure,
            recorder: None,
            last_frame: FrameState::default(),
        }
    }

    /// Attach the external statistics store
    pub fn with_recorder(mut self, recorder: Box<dyn ScoreRecorder + Send>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Route a UI intent
    pub fn apply(&mut self, command: Command) -> Result<(), SchedulerError> {
        match command {
            Command::SetBpm(bpm) => self.scheduler.set_bpm(bpm),
            Command::SetTimeSignature(time_signature) => self.set_time_signature(time_signature),
            Command::SetAudioSubdivision(subdivision) => {
                self.scheduler.set_audio_subdivision(subdivision)
            }
            Command::SetVisualSubdivision(subdivision) => self.set_visual_subdivision(subdivision),
            Command::SelectRudiment(id) => self.select_rudiment(&id),
            Command::SetVolume(volume) => self.scheduler.set_volume(volume),
            Command::SetTempoChangePolicy(policy) => self.scheduler.set_tempo_change_policy(policy),
            Command::Start => self.start()?,
            Command::Stop => {
                self.stop();
            }
            Command::TogglePlayback => {
                if self.is_playing() {
                    self.stop();
                } else {
                    self.start()?;
                }
            }
        }
        Ok(())
    }

    /// Start the click track. A no-op while playing.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.scheduler.is_playing() {
            return Ok(());
        }
        self.consumer.reset_sync();
        if let Ok(mut mailbox) = self.mailbox.lock() {
            *mailbox = BoundaryMailbox::default();
        }

        let mailbox = Arc::clone(&self.mailbox);
        let on_boundary: BoundaryCallback = Box::new(move |event: BoundaryEvent| {
            if let Ok(mut mailbox) = mailbox.lock() {
                mailbox.receive(event);
            }
        });
        self.scheduler.start(on_boundary)?;
        log::info!(
            "Practice started: {} {} {}",
            self.scheduler.config().tempo,
            self.scheduler.config().time_signature,
            self.rudiment.name
        );
        Ok(())
    }

    /// Stop the click track and report the run. `None` when already stopped.
    ///
    /// Changes still waiting for a boundary are applied, so the next run plays
    /// what the controls show.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        if !self.scheduler.is_playing() {
            return None;
        }
        let now = self.scheduler.current_time();
        let pending = *self.scheduler.pending();
        self.scheduler.stop();

        let summary = SessionSummary {
            bpm: self.scheduler.config().tempo.bpm(),
            duration_seconds: (now - self.scheduler.start_time()).max(0.0),
        };
        if let Some(tempo) = pending.bpm {
            self.scheduler.set_bpm(tempo.bpm());
        }
        if let Some(subdivision) = pending.audio_subdivision {
            self.scheduler.set_audio_subdivision(subdivision);
        }
        if let Some(time_signature) = pending.time_signature {
            self.scheduler.set_time_signature(time_signature);
        }
        log::info!(
            "Practice stopped after {:.1}s at {:.0} BPM",
            summary.duration_seconds,
            summary.bpm
        );
        if let Some(recorder) = self.recorder.as_mut() {
            let score = recorder.record_session(&summary);
            log::info!("Score updated: {}", score);
        }
        Some(summary)
    }

    /// Lookahead timer tick. Returns the number of clicks queued.
    pub fn poll(&mut self) -> usize {
        self.scheduler.poll()
    }

    /// Render tick: feed new anchors, compute the playhead
    pub fn frame(&mut self) -> FrameState {
        let now = self.scheduler.current_time();
        let playing = self.scheduler.is_playing();

        let incoming = self
            .mailbox
            .lock()
            .ok()
            .and_then(|mut mailbox| mailbox.take_due(now));
        if let Some(sync) = incoming {
            self.consumer.submit_sync(sync, now);
        }

        self.last_frame = self.consumer.tick(now, playing);
        self.last_frame
    }

    /// Change the meter of both the click track and the score.
    /// A click grid the new meter has no room for falls back like the score's.
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        self.scheduler.set_time_signature(time_signature);
        let audio_subdivision = self.scheduler.target_audio_subdivision();
        if !audio_subdivision.is_valid_for(&time_signature) {
            self.scheduler
                .set_audio_subdivision(visual_grid(audio_subdivision, &time_signature));
        }
        if self.visual_time_signature != time_signature {
            self.visual_time_signature = time_signature;
            self.regenerate_measure();
        }
    }

    /// Change the score's grid density (independent of the click density)
    pub fn set_visual_subdivision(&mut self, subdivision: SubdivisionKind) {
        if self.visual_subdivision != subdivision {
            self.visual_subdivision = subdivision;
            self.regenerate_measure();
        }
    }

    /// Pick a rudiment and adopt its default grid. Unknown ids use the first catalog entry.
    pub fn select_rudiment(&mut self, id: &str) {
        let rudiment = PatternLibrary::get_or_default(id);
        if rudiment.id == self.rudiment.id {
            return;
        }
        self.rudiment = rudiment;
        self.visual_subdivision = rudiment.default_subdivision;
        self.regenerate_measure();
    }

    fn regenerate_measure(&mut self) {
        let grid = visual_grid(self.visual_subdivision, &self.visual_time_signature);
        self.measure = MeasureGenerator::generate(self.visual_time_signature, grid, self.rudiment.id);
        self.consumer
            .submit_measure(self.measure.clone(), self.scheduler.is_playing());
    }

    /// Current settings, for saving back to disk
    pub fn settings(&self, base: &MetronomeConfig) -> MetronomeConfig {
        MetronomeConfig {
            bpm: self.scheduler.target_bpm(),
            volume: self.scheduler.volume(),
            time_signature: self.visual_time_signature.name.to_string(),
            audio_subdivision: self.scheduler.target_audio_subdivision(),
            visual_subdivision: self.visual_subdivision,
            rudiment_id: self.rudiment.id.to_string(),
            tempo_change: self.scheduler.tempo_change_policy(),
            ..base.clone()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn scheduler(&self) -> &AudioScheduler<C, S> {
        &self.scheduler
    }

    /// Newest generated measure (may still be queued for display)
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Measure the render loop is currently drawing
    pub fn displayed_measure(&self) -> &Measure {
        self.consumer.active_measure()
    }

    pub fn sync_consumer(&self) -> &SyncConsumer {
        &self.consumer
    }

    /// Last beat boundary scheduled by the click track
    pub fn last_beat(&self) -> Option<BoundaryEvent> {
        self.mailbox.lock().ok().and_then(|mailbox| mailbox.last_beat)
    }

    pub fn last_frame(&self) -> FrameState {
        self.last_frame
    }

    pub fn rudiment(&self) -> &'static Rudiment {
        self.rudiment
    }

    pub fn visual_subdivision(&self) -> SubdivisionKind {
        self.visual_subdivision
    }

    pub fn visual_time_signature(&self) -> TimeSignature {
        self.visual_time_signature
    }

    pub fn tempo_change_policy(&self) -> TempoChangePolicy {
        self.scheduler.tempo_change_policy()
    }
}

/// Quarter has no compound-meter grid; the score shows eighths instead
fn visual_grid(subdivision: SubdivisionKind, time_signature: &TimeSignature) -> SubdivisionKind {
    if subdivision.is_valid_for(time_signature) {
        subdivision
    } else {
        SubdivisionKind::Eighth
    }
}
