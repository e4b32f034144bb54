//! Tap window generation engine
//!
//! Walks the flattened elements of a level once, in beats, and converts the walk into
//! wall-clock windows for a given tempo and start time.

use crate::ast::*;
use crate::measure::Measure;
use super::types::{ElementPosition, ScheduledTap, TapWindow, TimingConfig};

/// One element visited by the walk, in playing order.
///
/// Tuplets are expanded: each inner element is its own step with its real (scaled) beats.
#[derive(Debug, Clone, Copy)]
struct Step {
    position: ElementPosition,
    beats: f64,
    tapped: bool,
}

/// Visit every element in order, marking which ones start a new sound.
///
/// A note is tapped unless the note before it tied into it. Rests are never tapped.
/// The tie check looks at the following element: the next inner element inside a tuplet, or
/// the next top-level element once the tuplet's last element is reached.
fn walk(elements: &[&Element]) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut skip_next = false;

    for (index, &element) in elements.iter().enumerate() {
        let next = elements.get(index + 1).copied();

        match element {
            Element::Rest(rest) => steps.push(Step {
                position: ElementPosition::top_level(index),
                beats: rest.beats(),
                tapped: false,
            }),
            Element::Note(note) => {
                let tapped = !skip_next;
                skip_next = tapped && next.map_or(false, |following| is_tie(element, following));
                steps.push(Step {
                    position: ElementPosition::top_level(index),
                    beats: note.beats(),
                    tapped,
                });
            }
            Element::Tuplet(tuplet) => {
                for (inner_index, inner) in tuplet.iter().enumerate() {
                    let position = ElementPosition::in_tuplet(index, inner_index);
                    let beats = inner.beats() * tuplet.scale();

                    if inner.is_rest() {
                        steps.push(Step {
                            position,
                            beats,
                            tapped: false,
                        });
                        continue;
                    }

                    let following = tuplet.get(inner_index + 1).or(next);
                    let tapped = !skip_next;
                    skip_next =
                        tapped && following.map_or(false, |following| is_tie(inner, following));
                    steps.push(Step {
                        position,
                        beats,
                        tapped,
                    });
                }
            }
        }
    }

    steps
}

/// Generate the tap windows for a sequence of measures, paired with the notes that produce them.
///
/// # Arguments
/// * `measures` - Parsed measures, played back to back
/// * `config` - Tempo and lenience
/// * `start_time` - Wall-clock time (seconds) at which the first measure begins
///
/// # Returns
/// One entry per audible note, in playing order. Begins are non-decreasing.
pub fn schedule(measures: &[Measure], config: &TimingConfig, start_time: f64) -> Vec<ScheduledTap> {
    warn_on_tempo(config.tempo);

    let lenience = config.lenience_seconds();
    let elements = Measure::flatten(measures);
    let mut center = start_time + lenience;
    let mut taps = Vec::new();

    for step in walk(&elements) {
        if step.tapped {
            taps.push(ScheduledTap {
                position: step.position,
                window: TapWindow::around(center, lenience),
            });
        }
        center += beats_to_seconds(step.beats, config.tempo);
    }

    log::debug!(
        "Scheduled {} tap windows over {} elements at {} bpm",
        taps.len(),
        elements.len(),
        config.tempo
    );

    taps
}

/// Generate just the tap windows, in playing order.
///
/// Same as [`schedule`] without the element positions.
pub fn tap_windows(measures: &[Measure], config: &TimingConfig, start_time: f64) -> Vec<TapWindow> {
    schedule(measures, config, start_time)
        .into_iter()
        .map(|tap| tap.window)
        .collect()
}

/// Number of taps the measures expect (notes minus tie continuations). Independent of tempo.
pub fn audible_count(measures: &[Measure]) -> usize {
    walk(&Measure::flatten(measures))
        .iter()
        .filter(|step| step.tapped)
        .count()
}

/// Position of the last note that produces a window, or `None` if nothing is tapped.
///
/// Hosts use this to know when the final sound of a level has been played.
pub fn last_audible(measures: &[Measure]) -> Option<ElementPosition> {
    walk(&Measure::flatten(measures))
        .into_iter()
        .rev()
        .find(|step| step.tapped)
        .map(|step| step.position)
}
