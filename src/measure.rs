//! # Measures
//!
//! A `Measure` is an immutable, validated run of elements under one time signature and one
//! accent (beat-grouping) pattern.
//!
//! ## Validation Rules
//!
//! ### Beat Sum
//! - The elements' beats (real beats for tuplets) must not exceed the time signature numerator
//! - A measure may be under-full; it is never silently truncated when over-full
//! - Example: In 4/4, `1 1 1 1` fits, `1 1 1 1 1` fails construction
//!
//! ### Beat Grouping
//! - Each group is at least one beat and the groups sum to the numerator
//! - Example: `5/8 (2+3)` is valid, `5/8 (2+2)` is not
//! - Default: all threes for 3n/8 meters, otherwise a single group of `numerator` beats
//!
//! ### Contents
//! - A measure holds at least one element (notation text cannot spell an empty measure)
//! - Every tuplet must have been built for this meter: its scale has to match the scale the
//!   measure's time signature gives for the same division count
//! - Example: a duplet built for 6/8 (scale 1.5) is rejected in 4/4 (scale 1)
//!
//! All checks run in [`Measure::new`]; a failure returns `InvalidArgument` and no measure.
//!
//! ## Related Modules
//! - `ast` - Element types held by a measure
//! - `parser` - Builds measures from notation lines
//! - `timing` - Reads flattened measures to produce tap windows

use std::ops::Index;

use crate::ast::*;
use crate::error::NotationError;

/// Floating point slack for beat sums built from tuplet fractions.
const BEAT_TOLERANCE: f64 = 1e-9;

/// A single measure containing musical elements
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    time_signature: TimeSignature,
    elements: Vec<Element>,
    beat_grouping: Vec<u32>,
}

impl Measure {
    /// Build a measure from an element sequence.
    ///
    /// `beat_grouping` of `None` uses [`TimeSignature::default_beat_grouping`].
    ///
    /// # Errors
    /// `InvalidArgument` when the time signature is degenerate, `elements` is empty, a tuplet was
    /// built for another meter, the elements overflow the measure, or the beat grouping does not
    /// partition the numerator.
    ///
    /// # Example
    /// ```
    /// use tapnote::{Element, Measure, Note, TimeSignature};
    ///
    /// let ts = TimeSignature::new(5, 8).unwrap();
    /// let note = |beats| Element::Note(Note::new(beats).unwrap());
    /// let elements = vec![note(2.0), note(3.0)];
    /// let measure = Measure::new(elements, ts, Some(vec![2, 3])).unwrap();
    /// assert_eq!(measure.beat_grouping(), &[2, 3]);
    /// ```
    pub fn new(
        elements: Vec<Element>,
        time_signature: TimeSignature,
        beat_grouping: Option<Vec<u32>>,
    ) -> Result<Self, NotationError> {
        time_signature.validate()?;
        if elements.is_empty() {
            return Err(NotationError::InvalidArgument(format!(
                "A {} measure needs at least one element",
                time_signature
            )));
        }
        validate_tuplets(&elements, &time_signature)?;
        validate_beat_sum(&elements, &time_signature)?;

        let beat_grouping = match beat_grouping {
            Some(grouping) => {
                validate_beat_grouping(&grouping, &time_signature)?;
                grouping
            }
            None => time_signature.default_beat_grouping(),
        };

        Ok(Self {
            time_signature,
            elements,
            beat_grouping,
        })
    }

    /// A default "click track" measure: `numerator` C4 notes of `1 / denominator` beats each.
    /// Used when a level supplies no notation.
    pub fn click_track(time_signature: TimeSignature) -> Result<Self, NotationError> {
        time_signature.validate()?;
        let beats = 1.0 / time_signature.denominator as f64;
        let elements = (0..time_signature.numerator)
            .map(|_| Note::new(beats).map(Element::Note))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(elements, time_signature, None)
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn beat_grouping(&self) -> &[u32] {
        &self.beat_grouping
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of top-level elements (a tuplet counts as one)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Sum of the elements' beats
    pub fn total_beats(&self) -> f64 {
        self.elements.iter().map(Element::beats).sum()
    }

    /// Length of a full measure in seconds (`numerator` beats), regardless of how full it is.
    pub fn duration_seconds(&self, tempo: f64) -> f64 {
        warn_on_tempo(tempo);
        beats_to_seconds(self.time_signature.numerator as f64, tempo)
    }

    /// Ordered concatenation of every measure's elements. Measure boundaries are not marked.
    pub fn flatten(measures: &[Measure]) -> Vec<&Element> {
        measures.iter().flat_map(|m| m.elements.iter()).collect()
    }
}

impl Index<usize> for Measure {
    type Output = Element;

    fn index(&self, index: usize) -> &Element {
        &self.elements[index]
    }
}

impl<'a> IntoIterator for &'a Measure {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

fn validate_tuplets(
    elements: &[Element],
    time_signature: &TimeSignature,
) -> Result<(), NotationError> {
    for tuplet in elements.iter().filter_map(Element::as_tuplet) {
        let expected = tuplet_scale(tuplet.num_divisions(), time_signature);
        if tuplet.scale() != expected {
            return Err(NotationError::InvalidArgument(format!(
                "A {}-tuplet scaled by {} does not belong in {} (expected a scale of {})",
                tuplet.num_divisions(),
                tuplet.scale(),
                time_signature,
                expected
            )));
        }
    }
    Ok(())
}

fn validate_beat_sum(
    elements: &[Element],
    time_signature: &TimeSignature,
) -> Result<(), NotationError> {
    let total: f64 = elements.iter().map(Element::beats).sum();
    let capacity = time_signature.numerator as f64;

    if total > capacity + BEAT_TOLERANCE {
        return Err(NotationError::InvalidArgument(format!(
            "Elements take {} beats but the {} measure only holds {}",
            total, time_signature, capacity
        )));
    }

    Ok(())
}

fn validate_beat_grouping(
    grouping: &[u32],
    time_signature: &TimeSignature,
) -> Result<(), NotationError> {
    let describe = || {
        grouping
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("+")
    };

    if grouping.is_empty() || grouping.contains(&0) {
        return Err(NotationError::InvalidArgument(format!(
            "Beat grouping ({}) must consist of groups of at least one beat",
            describe()
        )));
    }

    let sum: u32 = grouping.iter().sum();
    if sum != time_signature.numerator {
        return Err(NotationError::InvalidArgument(format!(
            "The beat grouping of ({}) is incompatible with the time signature of {}",
            describe(),
            time_signature
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(beats: &[f64]) -> Vec<Element> {
        beats
            .iter()
            .map(|&b| Element::Note(Note::new(b).unwrap()))
            .collect()
    }

    fn ts(numerator: u32, denominator: u32) -> TimeSignature {
        TimeSignature::new(numerator, denominator).unwrap()
    }

    #[test]
    fn test_full_measure() {
        let measure = Measure::new(notes(&[1.0, 1.0, 1.0, 1.0]), ts(4, 4), None).unwrap();
        assert_eq!(measure.len(), 4);
        assert_eq!(measure.total_beats(), 4.0);
        assert_eq!(measure.beat_grouping(), &[4]);
    }

    #[test]
    fn test_under_full_measure_is_allowed() {
        let measure = Measure::new(notes(&[1.0, 1.0]), ts(4, 4), None).unwrap();
        assert_eq!(measure.len(), 2);
    }

    #[test]
    fn test_overflowing_measure_fails() {
        let result = Measure::new(notes(&[1.0, 1.0, 1.0, 1.0, 0.5]), ts(4, 4), None);
        match result {
            Err(NotationError::InvalidArgument(message)) => {
                assert!(message.contains("only holds 4"), "got: {}", message);
            }
            other => panic!("Expected InvalidArgument but got: {:?}", other),
        }
    }

    #[test]
    fn test_triplet_fills_measure_exactly() {
        let time_signature = ts(2, 4);
        let triplet = Tuplet::new(3, notes(&[0.5, 0.5, 0.5]), time_signature).unwrap();
        let elements = vec![Element::Tuplet(triplet), Element::Note(Note::new(1.0).unwrap())];
        let measure = Measure::new(elements, time_signature, None).unwrap();
        assert!((measure.total_beats() - 2.0).abs() < 1e-9);
        assert_eq!(measure.len(), 2);
    }

    #[test]
    fn test_default_compound_grouping() {
        let measure = Measure::new(notes(&[3.0, 3.0]), ts(6, 8), None).unwrap();
        assert_eq!(measure.beat_grouping(), &[3, 3]);
    }

    #[test]
    fn test_explicit_grouping_must_sum_to_numerator() {
        assert!(Measure::new(notes(&[2.0, 3.0]), ts(5, 8), Some(vec![2, 3])).is_ok());
        assert!(Measure::new(notes(&[2.0, 3.0]), ts(5, 8), Some(vec![2, 2])).is_err());
        assert!(Measure::new(notes(&[2.0, 3.0]), ts(5, 8), Some(vec![5, 0])).is_err());
        assert!(Measure::new(notes(&[2.0, 3.0]), ts(5, 8), Some(vec![])).is_err());
    }

    #[test]
    fn test_empty_measure_is_rejected() {
        match Measure::new(vec![], ts(4, 4), None) {
            Err(NotationError::InvalidArgument(message)) => {
                assert!(message.contains("at least one element"), "got: {}", message);
            }
            other => panic!("Expected InvalidArgument but got: {:?}", other),
        }
    }

    #[test]
    fn test_tuplet_from_another_meter_is_rejected() {
        let duplet = Tuplet::new(2, notes(&[1.0, 1.0]), ts(6, 8)).unwrap();
        assert_eq!(duplet.beats(), 3.0);

        let result = Measure::new(vec![Element::Tuplet(duplet.clone())], ts(4, 4), None);
        assert!(matches!(result, Err(NotationError::InvalidArgument(_))));

        // Same meter, or another meter with the same scale, is fine
        assert!(Measure::new(vec![Element::Tuplet(duplet)], ts(6, 8), None).is_ok());
        let triplet = Tuplet::new(3, notes(&[0.5, 0.5, 0.5]), ts(4, 4)).unwrap();
        assert!(Measure::new(vec![Element::Tuplet(triplet)], ts(2, 4), None).is_ok());
    }

    #[test]
    fn test_degenerate_time_signature() {
        let zero = TimeSignature {
            numerator: 0,
            denominator: 4,
        };
        assert!(Measure::new(vec![], zero, None).is_err());
    }

    #[test]
    fn test_click_track() {
        let measure = Measure::click_track(ts(3, 4)).unwrap();
        assert_eq!(measure.len(), 3);
        for element in &measure {
            assert_eq!(element.beats(), 0.25);
            assert!(element.as_note().is_some());
        }
        assert_eq!(measure.beat_grouping(), &[3]);

        let compound = Measure::click_track(ts(6, 8)).unwrap();
        assert_eq!(compound.beat_grouping(), &[3, 3]);
    }

    #[test]
    fn test_indexing_and_get() {
        let measure = Measure::new(notes(&[1.0, 2.0]), ts(4, 4), None).unwrap();
        assert_eq!(measure[1].beats(), 2.0);
        assert!(measure.get(2).is_none());
    }

    #[test]
    fn test_flatten_preserves_order() {
        let first = Measure::new(notes(&[1.0, 2.0]), ts(3, 4), None).unwrap();
        let second = Measure::new(notes(&[0.5, 0.5, 1.0]), ts(2, 4), None).unwrap();
        let measures = [first, second];
        let flat = Measure::flatten(&measures);
        let beats: Vec<f64> = flat.iter().map(|e| e.beats()).collect();
        assert_eq!(beats, vec![1.0, 2.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_measure_duration_seconds() {
        let measure = Measure::click_track(ts(4, 4)).unwrap();
        assert_eq!(measure.duration_seconds(120.0), 2.0);
    }
}
