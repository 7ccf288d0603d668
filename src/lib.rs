// Rudiment Metronome - Library exports for tests and benchmarks

pub mod audio;
pub mod config;
pub mod messaging;
pub mod practice;
pub mod sequencer;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioEngine, DroppedClicks};
pub use audio::timing::{AudioClock, Clock, ManualClock};
pub use audio::{EngineError, EngineResult};
pub use config::{ConfigError, ConfigResult, MetronomeConfig};
pub use messaging::channels::{ClickConsumer, ClickProducer, create_click_channel};
pub use messaging::command::Command;
pub use practice::{
    LookaheadTimer, PracticeSession, ScoreRecorder, SessionSummary, SharedSession,
};
pub use sequencer::{
    AudioScheduler, ClickEvent, FrameState, Measure, MeasureGenerator, PatternLibrary,
    SchedulerError, SubdivisionKind, SyncConsumer, Tempo, TempoChangePolicy, TimeSignature,
    TransportState,
};
