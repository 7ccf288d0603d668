// Sequencer module - Tempo synchronization engine
// Rudiment catalog, measure generation, lookahead click scheduling and render-loop sync

pub mod measure;
pub mod metronome;
pub mod rudiment;
pub mod scheduler;
pub mod sync;
pub mod timeline;
pub mod transport;

pub use measure::{Measure, MeasureGenerator, MeasureId, Note};
pub use metronome::{AccentLevel, ClickEvent, ClickPlayer, ClickVoice};
pub use rudiment::{Hand, NoteType, PatternCell, PatternLibrary, Rudiment};
pub use scheduler::{
    AudioScheduler, BoundaryCallback, BoundaryEvent, ClickSink, PendingChanges, SchedulerConfig,
    SchedulerError, SchedulerTiming, SlotMetadata, SlotStep, TempoChangePolicy, step_slot,
};
pub use sync::{FrameState, MeasureSync, SyncConsumer, SyncTuning};
pub use timeline::{BeatUnit, SubdivisionKind, Tempo, TimeSignature};
pub use transport::TransportState;
