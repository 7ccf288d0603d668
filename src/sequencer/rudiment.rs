// Rudiment - Static catalog of sticking patterns
// A rudiment is a named, cyclic hand pattern used to fill a measure

use super::timeline::SubdivisionKind;

/// Which hand plays a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Right,
    Left,
    /// Empty placeholder, rendered as a rest
    Ghost,
}

impl Hand {
    /// Sticking letter shown in the score ("R", "L", or blank for a rest)
    pub fn symbol(self) -> &'static str {
        match self {
            Hand::Right => "R",
            Hand::Left => "L",
            Hand::Ghost => "",
        }
    }
}

/// Articulation of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteType {
    Normal,
    Accent,
    Ghost,
    Flam,
    Drag,
}

/// One position in a rudiment's pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternCell {
    pub hand: Hand,
    pub note_type: NoteType,
}

impl PatternCell {
    pub const fn new(hand: Hand, note_type: NoteType) -> Self {
        Self { hand, note_type }
    }
}

/// A named sticking pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rudiment {
    pub id: &'static str,
    pub name: &'static str,
    /// Cycled across the measure (slot index modulo pattern length)
    pub pattern: &'static [PatternCell],
    pub default_subdivision: SubdivisionKind,
}

const fn r() -> PatternCell {
    PatternCell::new(Hand::Right, NoteType::Normal)
}
const fn l() -> PatternCell {
    PatternCell::new(Hand::Left, NoteType::Normal)
}
const fn r_acc() -> PatternCell {
    PatternCell::new(Hand::Right, NoteType::Accent)
}
const fn l_acc() -> PatternCell {
    PatternCell::new(Hand::Left, NoteType::Accent)
}
const fn r_flam() -> PatternCell {
    PatternCell::new(Hand::Right, NoteType::Flam)
}
const fn l_flam() -> PatternCell {
    PatternCell::new(Hand::Left, NoteType::Flam)
}
const fn r_drag() -> PatternCell {
    PatternCell::new(Hand::Right, NoteType::Drag)
}
const fn l_drag() -> PatternCell {
    PatternCell::new(Hand::Left, NoteType::Drag)
}
const fn rest() -> PatternCell {
    PatternCell::new(Hand::Ghost, NoteType::Ghost)
}

/// Rudiment catalog. The first entry is the fallback for unknown ids.
pub static RUDIMENTS: &[Rudiment] = &[
    Rudiment {
        id: "single-stroke-roll",
        name: "Single Stroke Roll",
        pattern: &[r(), l()],
        default_subdivision: SubdivisionKind::Sixteenth,
    },
    Rudiment {
        id: "double-stroke-roll",
        name: "Double Stroke Roll",
        pattern: &[r(), r(), l(), l()],
        default_subdivision: SubdivisionKind::Sixteenth,
    },
    Rudiment {
        id: "single-paradiddle",
        name: "Single Paradiddle",
        pattern: &[r_acc(), l(), r(), r(), l_acc(), r(), l(), l()],
        default_subdivision: SubdivisionKind::Sixteenth,
    },
    Rudiment {
        id: "double-paradiddle",
        name: "Double Paradiddle",
        pattern: &[
            r_acc(),
            l(),
            r(),
            l(),
            r(),
            r(),
            l_acc(),
            r(),
            l(),
            r(),
            l(),
            l(),
        ],
        default_subdivision: SubdivisionKind::Triplet,
    },
    Rudiment {
        id: "paradiddle-diddle",
        name: "Paradiddle-Diddle",
        pattern: &[r_acc(), l(), r(), r(), l(), l()],
        default_subdivision: SubdivisionKind::Triplet,
    },
    Rudiment {
        id: "single-stroke-four",
        name: "Single Stroke Four",
        pattern: &[r_acc(), l(), r(), l(), rest(), rest()],
        default_subdivision: SubdivisionKind::Triplet,
    },
    Rudiment {
        id: "triplet-singles",
        name: "Triplet Singles",
        pattern: &[r_acc(), l(), r(), l_acc(), r(), l()],
        default_subdivision: SubdivisionKind::Triplet,
    },
    Rudiment {
        id: "flam",
        name: "Alternating Flams",
        pattern: &[r_flam(), l_flam()],
        default_subdivision: SubdivisionKind::Eighth,
    },
    Rudiment {
        id: "flam-tap",
        name: "Flam Tap",
        pattern: &[r_flam(), r(), l_flam(), l()],
        default_subdivision: SubdivisionKind::Sixteenth,
    },
    Rudiment {
        id: "drag",
        name: "Drag",
        pattern: &[r_drag(), rest(), l_drag(), rest()],
        default_subdivision: SubdivisionKind::Eighth,
    },
    Rudiment {
        id: "accented-eighths",
        name: "Accented Eighths",
        pattern: &[r_acc(), l(), r(), l()],
        default_subdivision: SubdivisionKind::Eighth,
    },
];

/// Read-only access to the rudiment catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternLibrary;

impl PatternLibrary {
    /// All rudiments in catalog order
    pub fn all() -> &'static [Rudiment] {
        RUDIMENTS
    }

    /// Find a rudiment by id
    pub fn find(id: &str) -> Option<&'static Rudiment> {
        RUDIMENTS.iter().find(|rudiment| rudiment.id == id)
    }

    /// Find a rudiment by id, falling back to the first catalog entry
    pub fn get_or_default(id: &str) -> &'static Rudiment {
        Self::find(id).unwrap_or(&RUDIMENTS[0])
    }
}
