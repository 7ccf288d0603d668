// Timeline - Musical grid representation
// Time signatures, tempo and the subdivision grid that turns them into slots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Note value that receives one beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeatUnit {
    /// x/4 meters (simple)
    Quarter,
    /// x/8 meters (compound)
    Eighth,
}

impl BeatUnit {
    /// Denominator as written in the time signature
    pub fn denominator(self) -> u8 {
        match self {
            BeatUnit::Quarter => 4,
            BeatUnit::Eighth => 8,
        }
    }
}

/// Time signature (beats per measure / beat unit)
/// Example: 6/8 = TimeSignature { beats_per_measure: 6, beat_unit: Eighth, name: "6/8" }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    pub beats_per_measure: u8,
    pub beat_unit: BeatUnit,
    pub name: &'static str,
}

/// Time signatures offered to the player
pub const TIME_SIGNATURES: [TimeSignature; 7] = [
    TimeSignature::new(2, BeatUnit::Quarter, "2/4"),
    TimeSignature::new(3, BeatUnit::Quarter, "3/4"),
    TimeSignature::new(4, BeatUnit::Quarter, "4/4"),
    TimeSignature::new(5, BeatUnit::Quarter, "5/4"),
    TimeSignature::new(6, BeatUnit::Eighth, "6/8"),
    TimeSignature::new(7, BeatUnit::Eighth, "7/8"),
    TimeSignature::new(12, BeatUnit::Eighth, "12/8"),
];

impl TimeSignature {
    /// Creates a new time signature. A zero beat count is raised to 1.
    pub const fn new(beats_per_measure: u8, beat_unit: BeatUnit, name: &'static str) -> Self {
        Self {
            beats_per_measure: if beats_per_measure == 0 {
                1
            } else {
                beats_per_measure
            },
            beat_unit,
            name,
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        TIME_SIGNATURES[2]
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        TIME_SIGNATURES[1]
    }

    /// Common 6/8 time signature
    pub fn six_eight() -> Self {
        TIME_SIGNATURES[4]
    }

    /// Look up a catalog entry by its display name ("4/4", "6/8", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        TIME_SIGNATURES.iter().copied().find(|ts| ts.name == name)
    }

    /// True for x/8 meters, where the eighth note carries the beat
    pub fn is_compound(&self) -> bool {
        self.beat_unit == BeatUnit::Eighth
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Grid density of a measure.
/// Not a note count: combined with the time signature it yields slots per beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubdivisionKind {
    Quarter,
    Eighth,
    Sixteenth,
    Triplet,
}

impl SubdivisionKind {
    pub const ALL: [SubdivisionKind; 4] = [
        SubdivisionKind::Quarter,
        SubdivisionKind::Eighth,
        SubdivisionKind::Sixteenth,
        SubdivisionKind::Triplet,
    ];

    /// Slots per beat unit.
    ///
    /// Simple meters: Sixteenth=4, Triplet=3, Eighth=2, Quarter=1.
    /// Compound meters count from the eighth note: Sixteenth=2, Eighth=1, Triplet=3.
    /// Quarter has no compound grid; it degrades to one slot per eighth.
    pub fn slots_per_beat(self, time_signature: &TimeSignature) -> u32 {
        match (time_signature.beat_unit, self) {
            (BeatUnit::Quarter, SubdivisionKind::Sixteenth) => 4,
            (BeatUnit::Quarter, SubdivisionKind::Triplet) => 3,
            (BeatUnit::Quarter, SubdivisionKind::Eighth) => 2,
            (BeatUnit::Quarter, SubdivisionKind::Quarter) => 1,
            (BeatUnit::Eighth, SubdivisionKind::Sixteenth) => 2,
            (BeatUnit::Eighth, SubdivisionKind::Triplet) => 3,
            (BeatUnit::Eighth, SubdivisionKind::Eighth) => 1,
            (BeatUnit::Eighth, SubdivisionKind::Quarter) => 1,
        }
    }

    /// Number of slots in one measure of `time_signature`
    pub fn total_slots(self, time_signature: &TimeSignature) -> u32 {
        time_signature.beats_per_measure as u32 * self.slots_per_beat(time_signature)
    }

    /// Whether this grid is meaningful for the given meter
    pub fn is_valid_for(self, time_signature: &TimeSignature) -> bool {
        !(time_signature.is_compound() && self == SubdivisionKind::Quarter)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubdivisionKind::Quarter => "Quarter",
            SubdivisionKind::Eighth => "Eighth",
            SubdivisionKind::Sixteenth => "Sixteenth",
            SubdivisionKind::Triplet => "Triplet",
        }
    }
}

impl Default for SubdivisionKind {
    fn default() -> Self {
        SubdivisionKind::Quarter
    }
}

/// Tempo in BPM (Beats Per Minute), always within [MIN_BPM, MAX_BPM]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub const MIN_BPM: f64 = 40.0;
    pub const MAX_BPM: f64 = 240.0;

    /// Creates a new tempo, clamping out-of-range (or NaN) values
    pub fn new(bpm: f64) -> Self {
        let bpm = if bpm.is_nan() { 120.0 } else { bpm };
        Self {
            bpm: bpm.clamp(Self::MIN_BPM, Self::MAX_BPM),
        }
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of one measure in seconds
    pub fn measure_duration_seconds(&self, time_signature: &TimeSignature) -> f64 {
        self.beat_duration_seconds() * time_signature.beats_per_measure as f64
    }

    /// Duration of one grid slot in seconds
    pub fn slot_duration_seconds(
        &self,
        subdivision: SubdivisionKind,
        time_signature: &TimeSignature,
    ) -> f64 {
        self.beat_duration_seconds() / subdivision.slots_per_beat(time_signature) as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} BPM", self.bpm)
    }
}
