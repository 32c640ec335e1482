//! Key label resolution
//!
//! Maps a [`Pitch`] and a [`LabelMode`] to the text printed on a key.
//! Combinations a mode does not cover resolve to an empty label.

use crate::error::Error;
use crate::pitch::{Letter, Pitch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which textual convention labels a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// No label
    #[default]
    None,
    /// Letter names on white keys
    LettersWhite,
    /// Letter names on black keys
    LettersBlack,
    /// Letter names on every key
    LettersAll,
    /// Letter and octave on white keys
    LettersWhiteWithOctave,
    /// Letter and octave on black keys
    LettersBlackWithOctave,
    /// Letter and octave on every key
    LettersAllWithOctave,
    /// "C" on every C
    OnlyC,
    /// "C" on middle C only
    OnlyMiddleC,
    /// "Do" on every C
    OnlyDo,
    /// "Do" on middle C only
    OnlyMiddleCDo,
    /// Fixed-do solfège names on white keys
    Solfege,
}

impl LabelMode {
    /// Every mode, in declaration order
    pub const ALL: [LabelMode; 12] = [
        LabelMode::None,
        LabelMode::LettersWhite,
        LabelMode::LettersBlack,
        LabelMode::LettersAll,
        LabelMode::LettersWhiteWithOctave,
        LabelMode::LettersBlackWithOctave,
        LabelMode::LettersAllWithOctave,
        LabelMode::OnlyC,
        LabelMode::OnlyMiddleC,
        LabelMode::OnlyDo,
        LabelMode::OnlyMiddleCDo,
        LabelMode::Solfege,
    ];

    /// snake_case name, as used in config files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            LabelMode::None => "none",
            LabelMode::LettersWhite => "letters_white",
            LabelMode::LettersBlack => "letters_black",
            LabelMode::LettersAll => "letters_all",
            LabelMode::LettersWhiteWithOctave => "letters_white_with_octave",
            LabelMode::LettersBlackWithOctave => "letters_black_with_octave",
            LabelMode::LettersAllWithOctave => "letters_all_with_octave",
            LabelMode::OnlyC => "only_c",
            LabelMode::OnlyMiddleC => "only_middle_c",
            LabelMode::OnlyDo => "only_do",
            LabelMode::OnlyMiddleCDo => "only_middle_c_do",
            LabelMode::Solfege => "solfege",
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        LabelMode::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| Error::InvalidLabelMode(s.to_string()))
    }
}

/// Fixed-do solfège name for a natural letter
fn solfege(letter: Letter) -> &'static str {
    match letter {
        Letter::C => "Do",
        Letter::D => "Re",
        Letter::E => "Mi",
        Letter::F => "Fa",
        Letter::G => "Sol",
        Letter::A => "La",
        Letter::B => "Ti",
    }
}

/// Resolve the label for a pitch under the given mode
pub fn resolve_label(pitch: &Pitch, mode: LabelMode) -> String {
    let natural = pitch.is_white();
    let is_c = natural && pitch.letter == Letter::C;
    let letter = pitch.letter();

    match mode {
        LabelMode::None => String::new(),

        LabelMode::LettersWhite if natural => letter,
        LabelMode::LettersBlack if !natural => letter,
        LabelMode::LettersAll => letter,

        LabelMode::LettersWhiteWithOctave if natural => format!("{}{}", letter, pitch.octave),
        LabelMode::LettersBlackWithOctave if !natural => format!("{}{}", letter, pitch.octave),
        LabelMode::LettersAllWithOctave => format!("{}{}", letter, pitch.octave),

        LabelMode::OnlyC if is_c => "C".to_string(),
        LabelMode::OnlyMiddleC if pitch.is_middle_c() => "C".to_string(),
        LabelMode::OnlyDo if is_c => "Do".to_string(),
        LabelMode::OnlyMiddleCDo if pitch.is_middle_c() => "Do".to_string(),

        // Sharps and flats have no entry
        LabelMode::Solfege if natural => solfege(pitch.letter).to_string(),

        _ => String::new(),
    }
}
