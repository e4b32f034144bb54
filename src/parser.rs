//! # Parser Module
//!
//! This module reads the line-oriented notation text into [`Measure`]s.
//!
//! ## Grammar
//! ```text
//! input    := line ("\n" line)*            (input is trimmed first; one line = one measure)
//! line     := intro ":" contents
//! intro    := num "/" den [ "(" group ("+" group)* ")" ]
//! contents := token (" " token)*
//! token    := element | tuplet
//! element  := duration [ "/" pitch ] [ "/" extra ("," extra)* ]
//! pitch    := "R" | letter [accidental] digit
//! accidental := "#" | "b" | "*" | "d"      (sharp, flat, double sharp, double flat)
//! extra    := "T" | "U"                     (tie start, force unbeam)
//! tuplet   := divisions "=(" element ("-" element)* ")"
//! ```
//!
//! ### Field Disambiguation
//! Fields of an element are always in the order duration, pitch, extra arguments. When only one
//! optional field is present it is a pitch if it is `R` or ends in a digit, and extra arguments
//! otherwise. A missing pitch means `C4`.
//!
//! ### Tuplets
//! Inside a tuplet each element's duration counts divisions used, not real beats. The tuplet
//! scales them with the measure's time signature (see `ast::Tuplet`).
//!
//! ## Examples
//! ```text
//! 4/4: 0.5/C5 0.25/Eb4/T 0.25/Eb4 0.5/G5/U 0.5/C*3/T,U 0.5/C*3 1.5/F5
//! 6/8: 1 1/C#4 1/T,U 3/R
//! 5/8 (2+3): 2 3
//! 4/4: 3=(0.5-0.5/R-0.5) 3
//! ```
//!
//! ## Errors
//! - `FormatError` with the line number and offending token for anything off-grammar
//! - `InvalidMeasure` with the line number when a well-formed line describes an impossible
//!   measure (overflow, bad grouping, zero duration, nested tuplet)
//!
//! Either way no measure is returned for the input.
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<Vec<Measure>, NotationError>`
//!
//! ## Example
//! ```rust
//! use tapnote::parse;
//!
//! let measures = parse("4/4: 1 1 0.5/E4 0.5/E4 1/R\n6/8: 3=(1-1-1) 3/G4").unwrap();
//! assert_eq!(measures.len(), 2);
//! assert_eq!(measures[0].len(), 5);
//! assert_eq!(measures[1].len(), 2);
//! ```
//!
//! ## Related Modules
//! - `ast` - Element types built here
//! - `measure` - Validates each parsed line
//! - `notation` - Writes measures back into this grammar

use crate::ast::*;
use crate::error::NotationError;
use crate::measure::Measure;

/// Parses one line (one measure) of notation
struct LineParser<'a> {
    text: &'a str,
    line: usize,
}

impl<'a> LineParser<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self { text, line }
    }

    fn error(&self, token: &str, message: impl Into<String>) -> NotationError {
        NotationError::FormatError {
            line: self.line,
            token: token.to_string(),
            message: message.into(),
        }
    }

    fn parse_measure(&self) -> Result<Measure, NotationError> {
        let colon = self
            .text
            .find(':')
            .ok_or_else(|| self.error(self.text.trim(), "Missing ':' after the time signature"))?;

        let (time_signature, beat_grouping) = self.parse_intro(&self.text[..colon])?;

        let contents = &self.text[colon + 1..];
        let tokens: Vec<&str> = contents.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(self.error(self.text.trim(), "Measure has no elements"));
        }

        let mut elements = Vec::with_capacity(tokens.len());
        for token in tokens {
            let element = if token.contains('=') {
                self.parse_tuplet(token, time_signature)?
            } else {
                self.parse_element(token)?
            };
            elements.push(element);
        }

        let measure = Measure::new(elements, time_signature, beat_grouping)
            .map_err(|e| e.at_line(self.line))?;

        log::debug!(
            "Parsed measure on line {} ({}) with {} elements",
            self.line,
            time_signature,
            measure.len()
        );

        Ok(measure)
    }

    /// Parse "4/4" or "5/8 (2+3)". Whitespace inside the intro is ignored.
    fn parse_intro(
        &self,
        intro: &str,
    ) -> Result<(TimeSignature, Option<Vec<u32>>), NotationError> {
        let token = intro.trim();
        let compact: String = intro.chars().filter(|c| !c.is_whitespace()).collect();

        let (ts_part, grouping_part) = match compact.find('(') {
            Some(open) => {
                let inner = compact[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| self.error(token, "Unbalanced parentheses in beat grouping"))?;
                if inner.contains(|c: char| c == '(' || c == ')') {
                    return Err(self.error(token, "Unbalanced parentheses in beat grouping"));
                }
                (&compact[..open], Some(inner))
            }
            None => {
                if compact.contains(')') {
                    return Err(self.error(token, "Unbalanced parentheses in beat grouping"));
                }
                (compact.as_str(), None)
            }
        };

        let (numerator, denominator) = ts_part
            .split_once('/')
            .ok_or_else(|| self.error(token, "Time signature must look like <num>/<den>"))?;
        let numerator: u32 = numerator.parse().map_err(|_| {
            self.error(token, format!("Invalid time signature numerator '{}'", numerator))
        })?;
        let denominator: u32 = denominator.parse().map_err(|_| {
            self.error(token, format!("Invalid time signature denominator '{}'", denominator))
        })?;
        let time_signature =
            TimeSignature::new(numerator, denominator).map_err(|e| e.at_line(self.line))?;

        let beat_grouping = match grouping_part {
            Some(groups) => Some(
                groups
                    .split('+')
                    .map(|g| {
                        g.parse::<u32>()
                            .map_err(|_| self.error(token, format!("Invalid beat group '{}'", g)))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok((time_signature, beat_grouping))
    }

    /// Parse "3=(1-1/E4-1/R)"
    fn parse_tuplet(
        &self,
        token: &str,
        time_signature: TimeSignature,
    ) -> Result<Element, NotationError> {
        let (divisions, body) = token
            .split_once('=')
            .ok_or_else(|| self.error(token, "Tuplet must look like <divisions>=(<el>-<el>...)"))?;

        let num_divisions: u32 = divisions.parse().map_err(|_| {
            self.error(token, format!("Invalid tuplet division count '{}'", divisions))
        })?;

        let inner = body
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(|| self.error(token, "Tuplet elements must be wrapped in '(' and ')'"))?;

        if inner.contains('=') {
            return Err(NotationError::InvalidMeasure {
                line: self.line,
                message: format!("Tuplets cannot be nested inside other tuplets: '{}'", token),
            });
        }
        if inner.contains(|c: char| c == '(' || c == ')') {
            return Err(self.error(token, "Unbalanced brackets in tuplet"));
        }
        if inner.is_empty() {
            return Err(self.error(token, "Tuplet has no elements"));
        }

        let elements = inner
            .split('-')
            .map(|el| {
                if el.is_empty() {
                    return Err(self.error(token, "Empty element slot in tuplet"));
                }
                self.parse_element(el)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Tuplet::new(num_divisions, elements, time_signature)
            .map(Element::Tuplet)
            .map_err(|e| e.at_line(self.line))
    }

    /// Parse "duration[/pitch][/extra,args]"
    fn parse_element(&self, token: &str) -> Result<Element, NotationError> {
        let fields: Vec<&str> = token.split('/').collect();

        let (pitch, extra) = match fields.as_slice() {
            [_] => (None, None),
            [_, second] if looks_like_pitch(second) => (Some(*second), None),
            [_, second] => (None, Some(*second)),
            [_, second, third] => {
                if !looks_like_pitch(second) {
                    return Err(self.error(
                        token,
                        format!("Expected a pitch before the extra arguments, found '{}'", second),
                    ));
                }
                (Some(*second), Some(*third))
            }
            _ => {
                return Err(self.error(
                    token,
                    "Too many '/' separated fields (expected duration/pitch/extra arguments)",
                ))
            }
        };

        let beats: f64 = fields[0]
            .parse()
            .map_err(|_| self.error(token, format!("Invalid duration '{}'", fields[0])))?;

        if let Some(p) = pitch {
            if p.eq_ignore_ascii_case("R") {
                if extra.is_some() {
                    return Err(self.error(token, "Rests do not take extra arguments"));
                }
                return Rest::new(beats)
                    .map(Element::Rest)
                    .map_err(|e| e.at_line(self.line));
            }
        }

        let (name, accidental, octave) = match pitch {
            Some(p) => self.parse_pitch(token, p)?,
            None => (NoteName::C, Accidental::Natural, 4),
        };
        let (tied, force_unbeam) = match extra {
            Some(args) => self.parse_extra_args(token, args)?,
            None => (false, false),
        };

        let note = Note::new(beats)
            .and_then(|note| note.with_pitch(name, accidental, octave))
            .map_err(|e| e.at_line(self.line))?
            .with_tie(tied)
            .with_force_unbeam(force_unbeam);

        Ok(Element::Note(note))
    }

    /// Parse "C4", "Eb4", "F*3"
    fn parse_pitch(
        &self,
        token: &str,
        pitch: &str,
    ) -> Result<(NoteName, Accidental, i8), NotationError> {
        let chars: Vec<char> = pitch.chars().collect();

        let (letter, accidental, octave) = match chars.as_slice() {
            [letter, octave] => (*letter, None, *octave),
            [letter, accidental, octave] => (*letter, Some(*accidental), *octave),
            _ => {
                return Err(self.error(
                    token,
                    format!(
                        "Invalid pitch '{}' (expected a letter, an optional accidental \
                         and a single-digit octave)",
                        pitch
                    ),
                ))
            }
        };

        let name = NoteName::from_char(letter)
            .ok_or_else(|| self.error(token, format!("Unknown pitch letter '{}'", letter)))?;

        let accidental = match accidental {
            Some(code) => Accidental::from_code(code)
                .ok_or_else(|| self.error(token, format!("Unknown accidental '{}'", code)))?,
            None => Accidental::Natural,
        };

        let octave = octave
            .to_digit(10)
            .ok_or_else(|| self.error(token, format!("Invalid octave '{}'", octave)))?;

        Ok((name, accidental, octave as i8))
    }

    /// Parse "T", "U" or "T,U"
    fn parse_extra_args(&self, token: &str, args: &str) -> Result<(bool, bool), NotationError> {
        let mut tied = false;
        let mut force_unbeam = false;

        for arg in args.split(',') {
            match arg {
                "T" => tied = true,
                "U" => force_unbeam = true,
                _ => {
                    return Err(self.error(
                        token,
                        format!("Unknown extra argument '{}' (expected T or U)", arg),
                    ))
                }
            }
        }

        Ok((tied, force_unbeam))
    }
}

/// Second-field disambiguation: a pitch is "R" or ends in a digit.
fn looks_like_pitch(field: &str) -> bool {
    field.eq_ignore_ascii_case("R") || field.chars().last().map_or(false, |c| c.is_ascii_digit())
}

/// Parse notation text into measures, one measure per line.
///
/// Empty (or all-whitespace) input yields no measures. Line numbers in errors refer to the
/// untrimmed source.
pub fn parse(source: &str) -> Result<Vec<Measure>, NotationError> {
    let trimmed_start = source.trim_start();
    let leading_lines = source[..source.len() - trimmed_start.len()]
        .matches('\n')
        .count();
    let text = trimmed_start.trim_end();

    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.lines()
        .enumerate()
        .map(|(i, line)| LineParser::new(line, leading_lines + i + 1).parse_measure())
        .collect()
}
