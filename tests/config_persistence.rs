// Integration test for settings persistence
// Tests the save/load cycle and recovery from bad files

use rudiment_metronome::config::TimingConfig;
use rudiment_metronome::{
    ConfigError, MetronomeConfig, SubdivisionKind, TempoChangePolicy, TimeSignature,
};
use std::fs;

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.ron");

    let config = MetronomeConfig {
        bpm: 84.0,
        volume: 0.5,
        time_signature: "7/8".to_string(),
        audio_subdivision: SubdivisionKind::Eighth,
        visual_subdivision: SubdivisionKind::Triplet,
        rudiment_id: "paradiddle-diddle".to_string(),
        tempo_change: TempoChangePolicy::NextMeasure,
        timing: TimingConfig {
            lookahead_interval_ms: 20.0,
            ..Default::default()
        },
        click_queue_capacity: 128,
    };

    // Parent directories are created on save
    config.save_to(&path).unwrap();
    assert!(path.exists());

    let loaded = MetronomeConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.time_signature().is_compound());
    assert!((loaded.timing.scheduler_timing().lookahead_interval - 0.020).abs() < 1e-12);
}

#[test]
fn test_out_of_range_file_is_sanitized_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(
        &path,
        "(bpm: 10.0, volume: -1.0, time_signature: \"9/4\", rudiment_id: \"moeller\")",
    )
    .unwrap();

    let loaded = MetronomeConfig::load_from(&path).unwrap();
    assert_eq!(loaded.bpm, 40.0);
    assert_eq!(loaded.volume, 0.0);
    assert_eq!(loaded.time_signature(), TimeSignature::four_four());
    assert_eq!(loaded.rudiment_id, "single-stroke-roll");
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(bpm: \"fast\"").unwrap();

    let result = MetronomeConfig::load_from(&path);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = MetronomeConfig::load_from(&dir.path().join("absent.ron"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
