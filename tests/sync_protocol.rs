//! Render-loop sync protocol against a live scheduler
//!
//! Downbeat boundaries are turned into `MeasureSync` anchors and fed to a
//! `SyncConsumer`; the playhead it reports must sit on the slot whose click
//! sounded last.

use rudiment_metronome::sequencer::scheduler::{BoundaryEvent, SchedulerTiming};
use rudiment_metronome::sequencer::sync::{MeasureSync, SyncTuning};
use rudiment_metronome::{
    AudioScheduler, ClickEvent, Clock, ManualClock, MeasureGenerator, SubdivisionKind,
    SyncConsumer, TimeSignature,
};
use std::sync::{Arc, Mutex};

const FRAME: f64 = 1.0 / 120.0;

fn downbeat_anchors(
    scheduler: &mut AudioScheduler<ManualClock, Vec<ClickEvent>>,
) -> Arc<Mutex<Vec<MeasureSync>>> {
    let anchors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&anchors);
    scheduler
        .start(Box::new(move |event: BoundaryEvent| {
            if event.beat_index == 0 {
                sink.lock().unwrap().push(MeasureSync {
                    start_time: event.scheduled_time,
                    bpm: event.bpm,
                });
            }
        }))
        .unwrap();
    anchors
}

#[test]
fn test_playhead_tracks_sounding_slot() {
    let clock = ManualClock::new(0.0);
    let mut scheduler = AudioScheduler::new(clock.clone(), Vec::new(), SchedulerTiming::default());
    scheduler.set_bpm(100.0);
    scheduler.set_audio_subdivision(SubdivisionKind::Sixteenth);

    let measure = MeasureGenerator::generate(
        TimeSignature::four_four(),
        SubdivisionKind::Sixteenth,
        "double-stroke-roll",
    );
    let mut consumer = SyncConsumer::new(measure, SyncTuning::default());
    let anchors = downbeat_anchors(&mut scheduler);

    let mut checked = 0;
    let mut t = 0.0;
    while t < 6.0 {
        t += FRAME;
        clock.set(t);
        scheduler.poll();
        for anchor in anchors.lock().unwrap().drain(..) {
            consumer.submit_sync(anchor, t);
        }
        let frame = consumer.tick(t, true);

        let sounded = scheduler.sink().iter().filter(|c| c.time <= t).count();
        if sounded == 0 {
            assert_eq!(frame.active_note, None);
            continue;
        }
        let last = scheduler.sink()[sounded - 1];
        // Skip frames that land on a slot edge
        let next_edge = scheduler.sink().get(sounded).map_or(f64::MAX, |c| c.time);
        if t - last.time < 1e-6 || next_edge - t < 1e-6 {
            continue;
        }
        assert_eq!(frame.active_note, Some((sounded - 1) % 16), "at {}", t);
        checked += 1;
    }
    assert!(checked > 500);
}

#[test]
fn test_future_anchor_waits_for_its_downbeat() {
    let clock = ManualClock::new(0.0);
    let mut scheduler = AudioScheduler::new(clock.clone(), Vec::new(), SchedulerTiming::default());
    scheduler.set_bpm(60.0);

    let measure = MeasureGenerator::generate(
        TimeSignature::three_four(),
        SubdivisionKind::Eighth,
        "single-stroke-roll",
    );
    scheduler.set_time_signature(TimeSignature::three_four());
    let mut consumer = SyncConsumer::new(measure, SyncTuning::default());
    let anchors = downbeat_anchors(&mut scheduler);

    // Run into the second measure (downbeat at 3.1s) and stop just before it
    let mut t = 0.0;
    while t < 3.05 {
        t += FRAME;
        clock.set(t);
        scheduler.poll();
        for anchor in anchors.lock().unwrap().drain(..) {
            consumer.submit_sync(anchor, t);
        }
        consumer.tick(t, true);
    }

    let active = consumer.active_params().unwrap();
    let next = consumer.next_params().unwrap();
    assert!((active.start_time - 0.1).abs() < 1e-9);
    assert!((next.start_time - 3.1).abs() < 1e-9);

    // Last beat of the first measure until the clock reaches 3.1s
    let frame = consumer.tick(3.05, true);
    assert_eq!(frame.beat_index, Some(2));

    clock.set(next.start_time);
    let frame = consumer.tick(clock.now(), true);
    assert_eq!(frame.beat_index, Some(0));
    assert_eq!(frame.active_note, Some(0));
    assert!(consumer.next_params().is_none());
}
