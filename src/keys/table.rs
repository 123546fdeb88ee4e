/*
Pitch Table
===========

The fixed 13-key layout: one octave from middle C plus the C above it.
White keys sit on the home row of a QWERTY keyboard, black keys on the
row above, between the white keys they belong to:

       w   e       t   y   u
     ┌─┬─┬─┬─┬─┬─┬─┬─┬─┬─┬─┬─┬─┐
     │ │█│ │█│ │ │█│ │█│ │█│ │ │
     │ └┬┘ └┬┘ │ └┬┘ └┬┘ └┬┘ │ │
     │ C│ D │ E│ F│ G │ A │ B│C│
     └──┴───┴──┴──┴───┴───┴──┴─┘
      a   s   d  f   g   h   j k

MIDI numbers follow note_number = 12 * (octave + 1) + semitone,
so C4 = 60 and C5 = 72.
*/

#[cfg(feature = "serde")]
use serde::Serialize;

/// Key colour, used by the UI to draw the keyboard.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// One key of the fixed layout.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteDefinition {
    pub name: &'static str,
    pub midi: u8,
    pub color: KeyColor,
    pub input_key: char,
}

const fn note(name: &'static str, midi: u8, color: KeyColor, input_key: char) -> NoteDefinition {
    NoteDefinition {
        name,
        midi,
        color,
        input_key,
    }
}

pub const KEY_COUNT: usize = 13;

pub static NOTES: [NoteDefinition; KEY_COUNT] = [
    note("C4", 60, KeyColor::White, 'a'),
    note("C#4", 61, KeyColor::Black, 'w'),
    note("D4", 62, KeyColor::White, 's'),
    note("D#4", 63, KeyColor::Black, 'e'),
    note("E4", 64, KeyColor::White, 'd'),
    note("F4", 65, KeyColor::White, 'f'),
    note("F#4", 66, KeyColor::Black, 't'),
    note("G4", 67, KeyColor::White, 'g'),
    note("G#4", 68, KeyColor::Black, 'y'),
    note("A4", 69, KeyColor::White, 'h'),
    note("A#4", 70, KeyColor::Black, 'u'),
    note("B4", 71, KeyColor::White, 'j'),
    note("C5", 72, KeyColor::White, 'k'),
];

/// Index into `NOTES` of the key mapped to `input_key`.
pub fn index_of(input_key: char) -> Option<usize> {
    NOTES.iter().position(|n| n.input_key == input_key)
}

/// MIDI number of the key mapped to `input_key`.
pub fn lookup(input_key: char) -> Option<u8> {
    index_of(input_key).map(|idx| NOTES[idx].midi)
}

/// Definition of the key at `index`.
pub fn note_at(index: usize) -> Option<&'static NoteDefinition> {
    NOTES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_one_octave_chromatically() {
        assert_eq!(NOTES.len(), 13);
        for (i, note) in NOTES.iter().enumerate() {
            assert_eq!(note.midi, 60 + i as u8, "{} out of order", note.name);
        }
    }

    #[test]
    fn eight_white_five_black() {
        let white = NOTES.iter().filter(|n| n.color == KeyColor::White).count();
        assert_eq!(white, 8);
        assert_eq!(NOTES.len() - white, 5);
    }

    #[test]
    fn input_keys_are_unique() {
        for (i, a) in NOTES.iter().enumerate() {
            for b in &NOTES[i + 1..] {
                assert_ne!(a.input_key, b.input_key);
            }
        }
    }

    #[test]
    fn lookup_maps_keys_to_midi() {
        assert_eq!(lookup('a'), Some(60));
        assert_eq!(lookup('h'), Some(69));
        assert_eq!(lookup('k'), Some(72));
        assert_eq!(lookup('q'), None);
        assert_eq!(lookup('A'), None);
    }

    #[test]
    fn note_at_bounds() {
        assert_eq!(note_at(0).map(|n| n.name), Some("C4"));
        assert!(note_at(KEY_COUNT).is_none());
    }
}
