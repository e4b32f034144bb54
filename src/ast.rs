//! # Notation Model
//!
//! This module defines the value types that describe notated rhythm: notes, rests and tuplets.
//!
//! ## Type Hierarchy
//! ```text
//! Element (enum)
//!   ├── Note
//!   │     ├── beats: f64
//!   │     ├── name: NoteName (A-G)
//!   │     ├── accidental: Accidental (𝄫 ♭ ♮ ♯ 𝄪)
//!   │     ├── octave: i8 (middle C = C4)
//!   │     ├── tied: bool (starts a tie into the next note)
//!   │     └── force_unbeam: bool (presentation hint only)
//!   ├── Rest
//!   │     └── beats: f64
//!   └── Tuplet
//!         ├── num_divisions: u32
//!         ├── elements: Vec<Element> (Note | Rest, never Tuplet)
//!         ├── scale: f64
//!         └── beats: f64 = sum(nominal beats) * scale
//! ```
//!
//! ## Key Concepts
//!
//! ### Beats
//! One beat is one denominator unit of the prevailing time signature: a quarter note in 4/4,
//! an eighth note in 6/8. Every element has `beats > 0`.
//!
//! ### Dotted Durations
//! Dotted-ness is never stored. A duration is dotted iff `beats / 1.5` is exactly a power of
//! two (`1.5`, `0.75`, `3.0`, `0.375`, ...). [`Element::base_beats`] strips the dot.
//!
//! ### Tuplets
//! A tuplet squeezes its inner elements into the time of a simpler subdivision:
//! - Even tuplets in compound meter (`6/8`, `9/8`, `12/8`): `scale = 3 / num_divisions`
//! - Everything else: `scale = 2^floor(log2(num_divisions)) / num_divisions`
//!
//! So `3=(1-1-1)` in 4/4 is three quarter notes in the time of two (`beats = 2`), and
//! `2=(1-1)` in 6/8 is a duplet of eighths filling a dotted quarter (`beats = 3`).
//!
//! ### Ties
//! A tie is computed, never stored on a pair: see [`is_tie`]. Only the first note of a tied
//! pair is tapped.
//!
//! ## Related Modules
//! - `measure` - Groups elements under a time signature
//! - `parser` - Creates these types from notation text
//! - `timing` - Converts them into tap windows

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::NotationError;

/// Largest accepted time signature numerator.
pub const MAX_NUMERATOR: u32 = 64;

/// Octaves writable as a single digit in notation text.
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i8> = 0..=9;

/// Mask of the explicit mantissa bits of an `f64`.
const MANTISSA_MASK: u64 = (1 << 52) - 1;

/// True when `x` is exactly `2^k` for some integer `k`.
pub(crate) fn is_power_of_two(x: f64) -> bool {
    x.is_normal() && x > 0.0 && x.to_bits() & MANTISSA_MASK == 0
}

/// Seconds taken by `beats` at `tempo` beats per minute.
pub(crate) fn beats_to_seconds(beats: f64, tempo: f64) -> f64 {
    beats / tempo * 60.0
}

/// Log the degenerate tempo case. Computation still goes ahead.
pub(crate) fn warn_on_tempo(tempo: f64) {
    if tempo.is_nan() || tempo <= 0.0 {
        log::warn!(
            "A tempo of {} was given (it is not greater than 0); durations will be meaningless",
            tempo
        );
    }
}

fn validate_beats(beats: f64) -> Result<(), NotationError> {
    if beats > 0.0 && beats.is_finite() {
        Ok(())
    } else {
        Err(NotationError::InvalidArgument(format!(
            "Element duration must be a positive number of beats, got {}",
            beats
        )))
    }
}

/// Converts an amount of beats into a note value for a time signature denominator.
/// One beat in 4/4 is `0.25` (a quarter note); one beat in 6/8 is `0.125`.
pub fn beats_to_value(beats: f64, denominator: u32) -> f64 {
    beats / denominator as f64
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, NotationError> {
        let ts = Self {
            numerator,
            denominator,
        };
        ts.validate()?;
        Ok(ts)
    }

    pub(crate) fn validate(&self) -> Result<(), NotationError> {
        if self.numerator == 0 || self.denominator == 0 {
            return Err(NotationError::InvalidArgument(format!(
                "Time signature {} must have a positive numerator and denominator",
                self
            )));
        }
        if self.numerator > MAX_NUMERATOR {
            return Err(NotationError::InvalidArgument(format!(
                "Time signature {} has more than {} beats per measure",
                self, MAX_NUMERATOR
            )));
        }
        Ok(())
    }

    /// Compound meter: 3n/8 (6/8, 9/8, 12/8, and 3/8 itself)
    pub fn is_compound(&self) -> bool {
        self.denominator == 8 && self.numerator % 3 == 0
    }

    /// Accent groups used when a measure does not spell one out.
    /// Compound meters group in threes; everything else is one group.
    pub fn default_beat_grouping(&self) -> Vec<u32> {
        if self.is_compound() {
            vec![3; (self.numerator / 3) as usize]
        } else {
            vec![self.numerator]
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

/// Accidental levels, from double flat (-1) to double sharp (+1) in half steps of 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    DoubleFlat,  // d
    Flat,        // b
    #[default]
    Natural,     // (none)
    Sharp,       // #
    DoubleSharp, // *
}

impl Accidental {
    /// Numeric level: -1, -0.5, 0, 0.5, 1
    pub fn value(&self) -> f64 {
        match self {
            Accidental::DoubleFlat => -1.0,
            Accidental::Flat => -0.5,
            Accidental::Natural => 0.0,
            Accidental::Sharp => 0.5,
            Accidental::DoubleSharp => 1.0,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        if value == -1.0 {
            Some(Accidental::DoubleFlat)
        } else if value == -0.5 {
            Some(Accidental::Flat)
        } else if value == 0.0 {
            Some(Accidental::Natural)
        } else if value == 0.5 {
            Some(Accidental::Sharp)
        } else if value == 1.0 {
            Some(Accidental::DoubleSharp)
        } else {
            None
        }
    }

    /// Single-character code used by the notation grammar.
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'd' => Some(Accidental::DoubleFlat),
            'b' => Some(Accidental::Flat),
            '#' => Some(Accidental::Sharp),
            '*' => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Grammar code, `None` for natural (which is written as no accidental at all).
    pub fn code(&self) -> Option<char> {
        match self {
            Accidental::DoubleFlat => Some('d'),
            Accidental::Flat => Some('b'),
            Accidental::Natural => None,
            Accidental::Sharp => Some('#'),
            Accidental::DoubleSharp => Some('*'),
        }
    }

    /// Display glyph
    pub fn symbol(&self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "𝄫",
            Accidental::Flat => "♭",
            Accidental::Natural => "",
            Accidental::Sharp => "♯",
            Accidental::DoubleSharp => "𝄪",
        }
    }

    /// Accepts display glyphs as well as the textual codes.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "𝄫" | "bb" | "d" => Some(Accidental::DoubleFlat),
            "♭" | "b" => Some(Accidental::Flat),
            "♮" | "" => Some(Accidental::Natural),
            "♯" | "#" => Some(Accidental::Sharp),
            "𝄪" | "*" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }
}

/// A musical note.
///
/// Equality (and hashing) only looks at pitch: name, accidental and octave. Duration and the
/// tie/unbeam flags are ignored, which is what [`is_tie`] needs.
#[derive(Debug, Clone, Copy)]
pub struct Note {
    beats: f64,
    name: NoteName,
    accidental: Accidental,
    octave: i8,
    tied: bool,
    force_unbeam: bool,
}

impl Note {
    /// A C4 lasting `beats`. Fails when `beats` is not a positive finite number.
    pub fn new(beats: f64) -> Result<Self, NotationError> {
        validate_beats(beats)?;
        Ok(Self {
            beats,
            name: NoteName::C,
            accidental: Accidental::Natural,
            octave: 4,
            tied: false,
            force_unbeam: false,
        })
    }

    /// Set the pitch. Fails when `octave` is outside [`OCTAVE_RANGE`].
    pub fn with_pitch(
        mut self,
        name: NoteName,
        accidental: Accidental,
        octave: i8,
    ) -> Result<Self, NotationError> {
        if !OCTAVE_RANGE.contains(&octave) {
            return Err(NotationError::InvalidArgument(format!(
                "Octave {} is outside {}..={}",
                octave,
                OCTAVE_RANGE.start(),
                OCTAVE_RANGE.end()
            )));
        }
        self.name = name;
        self.accidental = accidental;
        self.octave = octave;
        Ok(self)
    }

    pub fn with_tie(mut self, tied: bool) -> Self {
        self.tied = tied;
        self
    }

    pub fn with_force_unbeam(mut self, force_unbeam: bool) -> Self {
        self.force_unbeam = force_unbeam;
        self
    }

    pub fn beats(&self) -> f64 {
        self.beats
    }

    pub fn name(&self) -> NoteName {
        self.name
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// True if this note starts a tie into the next note
    pub fn is_tied(&self) -> bool {
        self.tied
    }

    /// True if this note must not be beamed with the next one
    pub fn is_force_unbeam(&self) -> bool {
        self.force_unbeam
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.accidental == other.accidental
            && self.octave == other.octave
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.accidental.hash(state);
        self.octave.hash(state);
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name.as_char(),
            self.accidental.symbol(),
            self.octave
        )
    }
}

/// A rest. Two rests are equal when they last the same number of beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rest {
    beats: f64,
}

impl Rest {
    pub fn new(beats: f64) -> Result<Self, NotationError> {
        validate_beats(beats)?;
        Ok(Self { beats })
    }

    pub fn beats(&self) -> f64 {
        self.beats
    }
}

impl fmt::Display for Rest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rest {}", self.beats)
    }
}

/// A tuplet (triplets, duplets, quintuplets, ...).
///
/// Inner elements keep their nominal beats ("divisions used"); the tuplet converts them to
/// real beats in the enclosing measure through its `scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuplet {
    num_divisions: u32,
    elements: Vec<Element>,
    scale: f64,
    beats: f64,
}

impl Tuplet {
    /// Build a tuplet for a measure in `time_signature`.
    ///
    /// The scale depends on the meter, so the tuplet only fits measures whose time signature
    /// gives the same scale; `Measure::new` rejects it anywhere else.
    ///
    /// # Errors
    /// `InvalidArgument` when `num_divisions` is zero, `elements` is empty, or an inner element
    /// is itself a tuplet.
    ///
    /// # Example
    /// ```
    /// use tapnote::{Element, Note, TimeSignature, Tuplet};
    ///
    /// let quarter = || Element::Note(Note::new(1.0).unwrap());
    /// let elements = vec![quarter(), quarter(), quarter()];
    /// let triplet = Tuplet::new(3, elements, TimeSignature::default()).unwrap();
    /// assert!((triplet.beats() - 2.0).abs() < 1e-9);
    /// ```
    pub fn new(
        num_divisions: u32,
        elements: Vec<Element>,
        time_signature: TimeSignature,
    ) -> Result<Self, NotationError> {
        if num_divisions == 0 {
            return Err(NotationError::InvalidArgument(
                "A tuplet needs a positive number of divisions".to_string(),
            ));
        }
        if elements.is_empty() {
            return Err(NotationError::InvalidArgument(
                "A tuplet needs at least one element".to_string(),
            ));
        }
        if elements.iter().any(|e| matches!(e, Element::Tuplet(_))) {
            return Err(NotationError::InvalidArgument(
                "Tuplets cannot be nested inside other tuplets".to_string(),
            ));
        }

        let scale = tuplet_scale(num_divisions, &time_signature);
        let nominal: f64 = elements.iter().map(Element::beats).sum();

        Ok(Self {
            num_divisions,
            elements,
            scale,
            beats: nominal * scale,
        })
    }

    pub fn num_divisions(&self) -> u32 {
        self.num_divisions
    }

    /// Factor converting an inner element's nominal beats into real beats
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Real beats occupied in the enclosing measure
    pub fn beats(&self) -> f64 {
        self.beats
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn first(&self) -> Option<&Element> {
        self.elements.first()
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Real beats of the inner element at `index`
    pub fn real_beats(&self, index: usize) -> Option<f64> {
        self.elements.get(index).map(|e| e.beats() * self.scale)
    }

    /// Real duration in seconds of the inner element at `index`
    pub fn real_duration(&self, index: usize, tempo: f64) -> Option<f64> {
        warn_on_tempo(tempo);
        self.real_beats(index).map(|beats| beats_to_seconds(beats, tempo))
    }
}

/// `num_divisions` must be positive.
pub(crate) fn tuplet_scale(num_divisions: u32, time_signature: &TimeSignature) -> f64 {
    let divisions = num_divisions as f64;
    if time_signature.is_compound() && num_divisions % 2 == 0 {
        3.0 / divisions
    } else {
        // Largest power of two not above num_divisions
        let lower = 1u32 << (u32::BITS - 1 - num_divisions.leading_zeros());
        lower as f64 / divisions
    }
}

/// An element in a measure: a note, a rest, or a tuplet of notes and rests
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Note(Note),
    Rest(Rest),
    Tuplet(Tuplet),
}

impl Element {
    /// Duration in beats (real beats for a tuplet)
    pub fn beats(&self) -> f64 {
        match self {
            Element::Note(note) => note.beats(),
            Element::Rest(rest) => rest.beats(),
            Element::Tuplet(tuplet) => tuplet.beats(),
        }
    }

    /// Duration with any dot removed.
    ///
    /// Assumes the grammar's durations: a power-of-two fraction or 1.5 times one.
    ///
    /// ```
    /// use tapnote::{Element, Note};
    ///
    /// let dotted_quarter = Element::Note(Note::new(1.5).unwrap());
    /// assert_eq!(dotted_quarter.base_beats(), 1.0);
    /// ```
    pub fn base_beats(&self) -> f64 {
        let beats = self.beats();
        let quotient = beats / 1.5;
        if is_power_of_two(quotient) {
            quotient
        } else {
            beats
        }
    }

    pub fn is_dotted(&self) -> bool {
        is_power_of_two(self.beats() / 1.5)
    }

    /// Duration in seconds: `beats / tempo * 60`. A non-positive tempo logs a warning.
    pub fn duration_seconds(&self, tempo: f64) -> f64 {
        warn_on_tempo(tempo);
        beats_to_seconds(self.beats(), tempo)
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Element::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn as_tuplet(&self) -> Option<&Tuplet> {
        match self {
            Element::Tuplet(tuplet) => Some(tuplet),
            _ => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Element::Rest(_))
    }
}

impl From<Note> for Element {
    fn from(note: Note) -> Self {
        Element::Note(note)
    }
}

impl From<Rest> for Element {
    fn from(rest: Rest) -> Self {
        Element::Rest(rest)
    }
}

impl From<Tuplet> for Element {
    fn from(tuplet: Tuplet) -> Self {
        Element::Tuplet(tuplet)
    }
}

/// Determines if two consecutive elements form a tied pair.
///
/// A tuplet stands in for its last element (when first) or its first element (when second).
/// The pair is a tie when both sides are notes, the first is marked tied, both share the same
/// pitch, and the second is not itself marked tied.
pub fn is_tie(first: &Element, second: &Element) -> bool {
    let first_note = match first {
        Element::Note(note) => Some(note),
        Element::Tuplet(tuplet) => tuplet.last().and_then(Element::as_note),
        Element::Rest(_) => None,
    };
    let second_note = match second {
        Element::Note(note) => Some(note),
        Element::Tuplet(tuplet) => tuplet.first().and_then(Element::as_note),
        Element::Rest(_) => None,
    };

    match (first_note, second_note) {
        (Some(a), Some(b)) => a.is_tied() && a == b && !b.is_tied(),
        _ => false,
    }
}
