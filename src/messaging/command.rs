// Types de commandes - Intents from the UI to the practice session

use crate::sequencer::scheduler::TempoChangePolicy;
use crate::sequencer::timeline::{SubdivisionKind, TimeSignature};

/// Configuration and transport intents.
/// Each is a no-op when the engine is already in the requested state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Tempo in BPM, clamped to 40-240
    SetBpm(f64),
    SetTimeSignature(TimeSignature),
    /// Click density of the audio track
    SetAudioSubdivision(SubdivisionKind),
    /// Grid density of the rendered score
    SetVisualSubdivision(SubdivisionKind),
    /// Rudiment id; unknown ids fall back to the first catalog entry
    SelectRudiment(String),
    /// Click volume, clamped to 0.0-1.0
    SetVolume(f32),
    SetTempoChangePolicy(TempoChangePolicy),
    Start,
    Stop,
    TogglePlayback,
}
