//! Pitch identity of a key
//!
//! A [`Pitch`] is a letter, an accidental and an octave in scientific pitch
//! notation (octave 4 contains middle C, MIDI note 60). Pitches built from
//! MIDI note numbers are spelled in the key of C, so every black key is a
//! sharp.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// MIDI note number of middle C (C4)
pub const MIDDLE_C_MIDI: u8 = 60;

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitones above C
    pub fn semitone(self) -> i16 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Upper case name of the letter
    pub fn as_str(self) -> &'static str {
        match self {
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::A => "A",
            Letter::B => "B",
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }
}

/// Sharp/flat/natural modifier on a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Semitone shift applied to the letter
    pub fn offset(self) -> i16 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    /// ASCII marker appended to the letter ("", "#" or "b")
    pub fn marker(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// Semantic identity of a musical note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub letter: Letter,
    pub accidental: Accidental,
    /// Octave number, scientific pitch notation
    pub octave: i8,
}

/// Spelling of the twelve pitch classes in the key of C
const SPELLING_IN_C: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

impl Pitch {
    pub fn new(letter: Letter, accidental: Accidental, octave: i8) -> Self {
        Self { letter, accidental, octave }
    }

    /// Build a pitch from a MIDI note number, spelled in the key of C
    pub fn from_midi(note: u8) -> Self {
        let (letter, accidental) = SPELLING_IN_C[(note % 12) as usize];
        let octave = (note / 12) as i8 - 1; // MIDI octave convention
        Self { letter, accidental, octave }
    }

    /// MIDI note number, or `None` when the pitch falls outside 0..=127
    pub fn midi_number(&self) -> Option<u8> {
        let base = (self.octave as i16 + 1) * 12;
        let note = base + self.letter.semitone() + self.accidental.offset();
        u8::try_from(note).ok().filter(|n| *n <= 127)
    }

    /// Pitch-class name including the accidental marker, e.g. "C" or "D#"
    pub fn letter(&self) -> String {
        format!("{}{}", self.letter.as_str(), self.accidental.marker())
    }

    /// Whether this pitch sits on a white key
    pub fn is_white(&self) -> bool {
        self.accidental == Accidental::Natural
    }

    /// Whether this pitch is middle C (C4)
    pub fn is_middle_c(&self) -> bool {
        self.letter == Letter::C && self.accidental == Accidental::Natural && self.octave == 4
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter.as_str(), self.accidental.marker(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = Error;

    /// Parse "C4", "c#3", "Bb-1", "F♯5"
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPitch(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let accidental = match chars.next() {
            Some('#') | Some('♯') => Accidental::Sharp,
            Some('b') | Some('♭') => Accidental::Flat,
            _ => Accidental::Natural,
        };
        let octave_str = if accidental == Accidental::Natural { rest } else { chars.as_str() };

        // i8 parsing would also take "+4"
        if octave_str.starts_with('+') {
            return Err(invalid());
        }
        let octave: i8 = octave_str.parse().map_err(|_| invalid())?;
        Ok(Self { letter, accidental, octave })
    }
}
