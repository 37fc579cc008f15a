//! Classification of a single input line

use crate::lexer::clean_line;
use crate::value::{is_float, parse_bool, parse_float, parse_int, Value};

const COMMENT_MARKERS: [&str; 4] = ["#", "!", "--", "=="];

/// A comma this close to the start makes the line a candidate list
const LIST_COMMA_LIMIT: usize = 30;

/// What a line holds once classified
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line {
    Comment,
    Scalar {
        value: Value,
        label: String,
        description: String,
    },
}

/// Split a line into value, label and description.
///
/// Lines without a recognisable label are comments. With `space_lists`, a value made of two
/// integers separated by a space is kept whole as a string.
pub(crate) fn classify(raw: &str, space_lists: bool) -> Line {
    let line = clean_line(raw);
    if line.is_empty() || COMMENT_MARKERS.iter().any(|m| line.starts_with(m)) {
        return Line::Comment;
    }

    let words: Vec<&str> = line.split(' ').collect();
    if words.len() > 2 && words[0].eq_ignore_ascii_case("end") && words[1] == "of" {
        return Line::Comment;
    }

    let (value, rest) = match list_value(&line) {
        Some((list, rest)) => (Value::List(list), rest),
        None => single_value(&line, space_lists),
    };

    let mut next = 0;
    while next < rest.len() {
        let word = rest[next].as_str();
        // `!XXX: old` annotations sit between the value and the label
        if word.starts_with('!') && word.ends_with(':') {
            next += 2;
        } else if is_float(word) {
            // a stale value left in front of the label
            next += 1;
        } else {
            return Line::Scalar {
                value,
                label: word.trim().to_string(),
                description: rest[next + 1..].join(" "),
            };
        }
    }
    Line::Comment
}

/// Comma separated numbers or booleans at the start of the line, and the words after them
fn list_value(line: &str) -> Option<(Vec<Value>, Vec<String>)> {
    let comma = line.find(',')?;
    if comma == 0 || comma >= LIST_COMMA_LIMIT {
        return None;
    }

    let tokens: Vec<&str> = line
        .split([' ', ','])
        .filter(|t| !t.is_empty())
        .collect();

    let mut values = Vec::new();
    for token in &tokens {
        let value = if let Some(i) = parse_int(token) {
            Value::Int(i)
        } else if let Some(f) = parse_float(token) {
            Value::Float(f)
        } else if let Some(b) = parse_bool(token) {
            Value::Bool(b)
        } else {
            break;
        };
        values.push(value);
    }

    if values.len() < 2 || values.len() == tokens.len() {
        return None;
    }

    // eat the values off the line so the label keeps its original spelling
    let mut remaining = line;
    for token in &tokens[..values.len()] {
        if let Some(position) = remaining.find(token) {
            remaining = &remaining[position + token.len()..];
        }
    }
    let rest = remaining
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>();
    Some((values, rest))
}

fn single_value(line: &str, space_lists: bool) -> (Value, Vec<String>) {
    let mut words: Vec<String> = line.split(' ').map(str::to_string).collect();
    merge_quoted(&mut words);

    let first = words.remove(0);
    let value = match Value::parse(&first) {
        Value::Int(_) if space_lists && words.first().is_some_and(|w| parse_int(w).is_some()) => {
            Value::Str(format!("{first} {}", words[0]))
        }
        value => value,
    };
    (value, words)
}

/// A value starting with a quote runs up to the closing quote
fn merge_quoted(words: &mut Vec<String>) {
    if !words.first().is_some_and(|w| w.starts_with('"')) {
        return;
    }
    let end = words
        .iter()
        .position(|w| w.ends_with('"'))
        .unwrap_or(words.len() - 1);
    let merged = words.drain(..=end).collect::<Vec<_>>().join(" ");
    words.insert(0, merged);
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::line::{classify, Line};
    use crate::value::Value;

    fn scalar(value: impl Into<Value>, label: &str, description: &str) -> Line {
        Line::Scalar {
            value: value.into(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn comments() {
        assert_eq!(classify("", false), Line::Comment);
        assert_eq!(classify("   ", false), Line::Comment);
        assert_eq!(classify("---- ELASTODYN ----", false), Line::Comment);
        assert_eq!(classify("! note", false), Line::Comment);
        assert_eq!(classify("== section ==", false), Line::Comment);
        assert_eq!(classify("# hash", false), Line::Comment);
        assert_eq!(classify("END of input file (the word \"END\" must appear)", false), Line::Comment);
        assert_eq!(classify("Just words", false), scalar("Just", "words", ""));
        assert_eq!(classify("42", false), Line::Comment);
    }

    #[test]
    fn scalars() {
        assert_eq!(
            classify("   3   NumBlNds   - Number of blade nodes (-)", false),
            scalar(3, "NumBlNds", "- Number of blade nodes (-)")
        );
        assert_eq!(
            classify("0.0125\tDT  - time step", false),
            scalar(0.0125, "DT", "- time step")
        );
        assert_eq!(
            classify("False   Echo  - Echo input", false),
            scalar(false, "Echo", "- Echo input")
        );
        assert_eq!(
            classify("\"default\"  WrMode", false),
            scalar("\"default\"", "WrMode", "")
        );
    }

    #[test]
    fn quoted_strings_are_merged() {
        assert_eq!(
            classify("\"Airfoils/Cylinder 1.dat\"  AFNames - files", false),
            scalar("\"Airfoils/Cylinder 1.dat\"", "AFNames", "- files")
        );
    }

    #[test]
    fn stale_values_and_annotations_are_skipped() {
        assert_eq!(
            classify("2   3   NBlades  - was 3", false),
            scalar(2, "NBlades", "- was 3")
        );
        assert_eq!(
            classify("1.5 !old: 2.0 TipRad - radius", false),
            scalar(1.5, "TipRad", "- radius")
        );
    }

    #[test]
    fn lists() {
        assert_eq!(
            classify("1, 2, 3   BlOutNd  - nodes", false),
            scalar(
                vec![Value::Int(1), Value::Int(2), Value::Int(3)],
                "BlOutNd",
                "- nodes"
            )
        );
        assert_eq!(
            classify("0.5,1.5 t  TwrGagNd", false),
            scalar(
                vec![Value::Float(0.5), Value::Float(1.5), Value::Bool(true)],
                "TwrGagNd",
                ""
            )
        );
        // a single value before the comma is not a list
        assert_eq!(
            classify("3 NumTwrNds - count, of nodes", false),
            scalar(3, "NumTwrNds", "- count, of nodes")
        );
    }

    #[test]
    fn space_separated_pairs() {
        assert_eq!(classify("1 49 - Member number", true), scalar("1 49", "-", "Member number"));
        assert_eq!(classify("1 49 - Member number", false), scalar(1, "-", "Member number"));
    }
}
