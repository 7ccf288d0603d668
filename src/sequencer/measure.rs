// Measure - Deterministic note generation from a rudiment
// Applies a rudiment's cyclic pattern across every slot of one measure

use super::rudiment::{Hand, NoteType, PatternLibrary};
use super::timeline::{SubdivisionKind, TimeSignature};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for generated measures
pub type MeasureId = u64;

/// Global measure ID generator (atomic for thread-safety)
static NEXT_MEASURE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique measure ID
pub fn generate_measure_id() -> MeasureId {
    NEXT_MEASURE_ID.fetch_add(1, Ordering::Relaxed)
}

/// One stroke (or rest) in a measure.
/// `id` is derived from the slot so regenerating the same measure yields equal notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub id: u32,
    pub hand: Hand,
    pub note_type: NoteType,
    pub slot_index: u32,
}

impl Note {
    /// True for ghost-hand cells, which render as an empty placeholder
    pub fn is_rest(&self) -> bool {
        self.hand == Hand::Ghost
    }
}

/// One measure of notes. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub id: MeasureId,
    pub time_signature: TimeSignature,
    pub subdivision: SubdivisionKind,
    pub notes: Vec<Note>,
}

impl Measure {
    /// Whether swapping `other` in would change what is drawn
    pub fn is_structurally_different(&self, other: &Measure) -> bool {
        self.id != other.id
            || self.notes.len() != other.notes.len()
            || self.time_signature.name != other.time_signature.name
    }

    /// Number of grid slots
    pub fn slot_count(&self) -> usize {
        self.notes.len()
    }

    /// Slots that fall on one beat
    pub fn slots_per_beat(&self) -> u32 {
        self.subdivision.slots_per_beat(&self.time_signature)
    }
}

/// Pure measure generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureGenerator;

impl MeasureGenerator {
    /// Build a measure for the given meter, grid and rudiment.
    ///
    /// Unknown rudiment ids fall back to the first catalog entry.
    /// Apart from `id`, the result depends only on the inputs.
    pub fn generate(
        time_signature: TimeSignature,
        subdivision: SubdivisionKind,
        rudiment_id: &str,
    ) -> Measure {
        if !subdivision.is_valid_for(&time_signature) {
            log::warn!(
                "{} grid requested for compound meter {}, using one slot per eighth",
                subdivision.label(),
                time_signature
            );
        }

        let rudiment = PatternLibrary::get_or_default(rudiment_id);
        let total_slots = subdivision.total_slots(&time_signature);
        let pattern = rudiment.pattern;

        let notes = (0..total_slots)
            .map(|slot| {
                let cell = pattern[slot as usize % pattern.len()];
                Note {
                    id: slot,
                    hand: cell.hand,
                    note_type: cell.note_type,
                    slot_index: slot,
                }
            })
            .collect();

        Measure {
            id: generate_measure_id(),
            time_signature,
            subdivision,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::rudiment::RUDIMENTS;

    #[test]
    fn test_slot_counts() {
        let measure = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Sixteenth,
            "single-stroke-roll",
        );
        assert_eq!(measure.slot_count(), 16);

        let measure = MeasureGenerator::generate(
            TimeSignature::six_eight(),
            SubdivisionKind::Eighth,
            "single-stroke-roll",
        );
        assert_eq!(measure.slot_count(), 6);

        let measure = MeasureGenerator::generate(
            TimeSignature::six_eight(),
            SubdivisionKind::Sixteenth,
            "single-stroke-roll",
        );
        assert_eq!(measure.slot_count(), 12);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = MeasureGenerator::generate(
            TimeSignature::three_four(),
            SubdivisionKind::Triplet,
            "paradiddle-diddle",
        );
        let b = MeasureGenerator::generate(
            TimeSignature::three_four(),
            SubdivisionKind::Triplet,
            "paradiddle-diddle",
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.notes, b.notes);
    }

    #[test]
    fn test_pattern_cycles_across_slots() {
        // Paradiddle (8 cells) over 12 triplet slots does not divide evenly
        let rudiment = PatternLibrary::find("single-paradiddle").unwrap();
        let measure = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Triplet,
            rudiment.id,
        );
        assert_eq!(measure.notes.len(), 12);
        for (i, note) in measure.notes.iter().enumerate() {
            let cell = rudiment.pattern[i % rudiment.pattern.len()];
            assert_eq!(note.hand, cell.hand);
            assert_eq!(note.note_type, cell.note_type);
            assert_eq!(note.slot_index as usize, i);
        }
    }

    #[test]
    fn test_unknown_rudiment_uses_first_entry() {
        let measure = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Eighth,
            "no-such-rudiment",
        );
        let first = &RUDIMENTS[0];
        assert_eq!(measure.notes[0].hand, first.pattern[0].hand);
        assert_eq!(measure.notes[1].hand, first.pattern[1 % first.pattern.len()].hand);
    }

    #[test]
    fn test_rests_from_ghost_cells() {
        let measure = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Eighth,
            "drag",
        );
        assert!(!measure.notes[0].is_rest());
        assert!(measure.notes[1].is_rest());
    }

    #[test]
    fn test_structural_difference() {
        let a = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Sixteenth,
            "flam-tap",
        );
        let same = a.clone();
        assert!(!a.is_structurally_different(&same));

        let regenerated = MeasureGenerator::generate(
            TimeSignature::four_four(),
            SubdivisionKind::Sixteenth,
            "flam-tap",
        );
        assert!(a.is_structurally_different(&regenerated));
    }
}
