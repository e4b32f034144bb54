use crate::ast::*;
use crate::measure::Measure;

/// Convert measures back into notation text, one line per measure.
///
/// Output always spells out the pitch so that re-parsing it gives back the same elements.
pub fn to_notation(measures: &[Measure]) -> String {
    measures
        .iter()
        .map(measure_to_notation)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write a single measure as one notation line
pub fn measure_to_notation(measure: &Measure) -> String {
    let mut line = String::new();
    let time_signature = measure.time_signature();

    line.push_str(&time_signature.to_string());

    // Only spell out the grouping when it differs from the default
    if measure.beat_grouping() != time_signature.default_beat_grouping().as_slice() {
        let groups: Vec<String> = measure.beat_grouping().iter().map(u32::to_string).collect();
        line.push_str(&format!(" ({})", groups.join("+")));
    }

    line.push(':');

    for element in measure.iter() {
        line.push(' ');
        line.push_str(&element_to_notation(element));
    }

    line
}

/// Write a single element token (a tuplet is written with its inner nominal beats)
pub fn element_to_notation(element: &Element) -> String {
    match element {
        Element::Note(note) => note_to_notation(note),
        Element::Rest(rest) => format!("{}/R", rest.beats()),
        Element::Tuplet(tuplet) => {
            let inner: Vec<String> = tuplet.iter().map(element_to_notation).collect();
            format!("{}=({})", tuplet.num_divisions(), inner.join("-"))
        }
    }
}

fn note_to_notation(note: &Note) -> String {
    let mut token = format!("{}/{}", note.beats(), pitch_to_notation(note));

    let mut extra = Vec::new();
    if note.is_tied() {
        extra.push("T");
    }
    if note.is_force_unbeam() {
        extra.push("U");
    }
    if !extra.is_empty() {
        token.push('/');
        token.push_str(&extra.join(","));
    }

    token
}

fn pitch_to_notation(note: &Note) -> String {
    let mut pitch = String::new();
    pitch.push(note.name().as_char());
    if let Some(code) = note.accidental().code() {
        pitch.push(code);
    }
    pitch.push_str(&note.octave().to_string());
    pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_simple_line() {
        let measures = parse("4/4: 1 1 1 1").unwrap();
        assert_eq!(to_notation(&measures), "4/4: 1/C4 1/C4 1/C4 1/C4");
    }

    #[test]
    fn test_flags_and_accidentals() {
        let measures = parse("4/4: 0.25/Eb4/T 0.25/Eb4 0.5/G5/U 0.5/C*3/T,U 0.5/Cd3 2/R").unwrap();
        assert_eq!(
            to_notation(&measures),
            "4/4: 0.25/Eb4/T 0.25/Eb4 0.5/G5/U 0.5/C*3/T,U 0.5/Cd3 2/R"
        );
    }

    #[test]
    fn test_tuplets_keep_nominal_beats() {
        let measures = parse("4/4: 3=(0.5-0.5/R-0.5/E4) 3").unwrap();
        assert_eq!(to_notation(&measures), "4/4: 3=(0.5/C4-0.5/R-0.5/E4) 3/C4");
    }

    #[test]
    fn test_grouping_written_only_when_not_default() {
        let measures = parse("6/8: 6\n6/8 (2+2+2): 6\n5/8 (2+3): 5\n5/8: 5").unwrap();
        let text = to_notation(&measures);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "6/8: 6/C4");
        assert_eq!(lines[1], "6/8 (2+2+2): 6/C4");
        assert_eq!(lines[2], "5/8 (2+3): 5/C4");
        assert_eq!(lines[3], "5/8: 5/C4");
    }

    #[test]
    fn test_empty_measure_list() {
        assert_eq!(to_notation(&[]), "");
    }
}
