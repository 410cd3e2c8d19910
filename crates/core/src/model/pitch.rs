use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PitchError {
    #[error("unknown pitch name: {0}")]
    UnknownName(String),
}

//
// ─── PITCH ────────────────────────────────────────────────────────────────────
//

/// One of the eight answerable scale degrees: the seven base degrees of the
/// major scale plus the octave-up tonic.
///
/// Serialized as the lowercase solfège name (`do` .. `si`, `do2`), which is
/// also the `Display`/`FromStr` round-trip form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pitch {
    Do,
    Re,
    Mi,
    Fa,
    So,
    La,
    Si,
    Do2,
}

impl Pitch {
    /// The seven base pitches in scale order, excluding the octave-up tonic.
    ///
    /// This is the pool the single-note question generator draws from.
    pub const BASE: [Pitch; 7] = [
        Pitch::Do,
        Pitch::Re,
        Pitch::Mi,
        Pitch::Fa,
        Pitch::So,
        Pitch::La,
        Pitch::Si,
    ];

    /// All eight selectable pitches in scale order.
    pub const ALL: [Pitch; 8] = [
        Pitch::Do,
        Pitch::Re,
        Pitch::Mi,
        Pitch::Fa,
        Pitch::So,
        Pitch::La,
        Pitch::Si,
        Pitch::Do2,
    ];

    /// Lowercase solfège name (`do`, `re`, .., `do2`).
    #[must_use]
    pub fn solfege(self) -> &'static str {
        match self {
            Pitch::Do => "do",
            Pitch::Re => "re",
            Pitch::Mi => "mi",
            Pitch::Fa => "fa",
            Pitch::So => "so",
            Pitch::La => "la",
            Pitch::Si => "si",
            Pitch::Do2 => "do2",
        }
    }

    /// Fixed-do letter name (`c` .. `b`, `c2`), used to derive image and
    /// audio file names.
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Pitch::Do => "c",
            Pitch::Re => "d",
            Pitch::Mi => "e",
            Pitch::Fa => "f",
            Pitch::So => "g",
            Pitch::La => "a",
            Pitch::Si => "b",
            Pitch::Do2 => "c2",
        }
    }

    /// Audio file name for this pitch (`c.wav` .. `c2.wav`).
    #[must_use]
    pub fn audio_file(self) -> String {
        format!("{}.wav", self.letter())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.solfege())
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    /// Accepts either the solfège name or the letter name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let found = Pitch::ALL
            .into_iter()
            .find(|p| p.solfege() == lower || p.letter() == lower);
        found.ok_or_else(|| PitchError::UnknownName(s.to_string()))
    }
}

//
// ─── PLAYBACK ELEMENT ─────────────────────────────────────────────────────────
//

/// One element of an audible rendition: a pitch, or a silence consuming the
/// inter-note gap with no sound.
///
/// Silence exists only here. Answer sequences are `Vec<Pitch>`, so "silence
/// is never a valid answer" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackElement {
    Note(Pitch),
    Silence,
}

impl PlaybackElement {
    /// Returns the pitch when this element is a note.
    #[must_use]
    pub fn pitch(self) -> Option<Pitch> {
        match self {
            PlaybackElement::Note(p) => Some(p),
            PlaybackElement::Silence => None,
        }
    }

    #[must_use]
    pub fn is_silence(self) -> bool {
        matches!(self, PlaybackElement::Silence)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
