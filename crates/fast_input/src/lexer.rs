//! Token level helpers shared by the line and table readers

use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

/// Single space separated, trimmed
pub(crate) fn clean_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop everything from `c` on, unless `c` starts the line
pub(crate) fn clean_after(line: &str, c: char) -> &str {
    match line.find(c) {
        Some(n) if n > 0 => &line[..n],
        _ => line,
    }
}

fn number<'s>(input: &mut &'s str) -> PResult<&'s str> {
    let start = *input;
    (
        opt(one_of(['+', '-'])),
        alt(((digit0, '.', digit1).void(), (digit1, opt('.')).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .void()
        .parse_next(input)?;
    Ok(&start[..start.len() - input.len()])
}

/// Every numeric literal of a line, whatever surrounds it
pub(crate) fn numeric_tokens(line: &str) -> Vec<f64> {
    let mut input = line;
    let mut values = Vec::new();
    while !input.is_empty() {
        let checkpoint = input;
        match number.parse_next(&mut input) {
            Ok(token) => {
                if let Ok(value) = token.parse() {
                    values.push(value);
                }
            }
            Err(_) => {
                let mut chars = checkpoint.chars();
                chars.next();
                input = chars.as_str();
            }
        }
    }
    values
}

fn enclosed<'s>(input: &mut &'s str, open: char, close: char) -> PResult<&'s str> {
    preceded(
        take_till(0.., open),
        delimited(open, take_till(0.., close), close),
    )
    .parse_next(input)
}

/// Contents of each `open`..`close` group of a line
pub(crate) fn enclosed_groups(line: &str, open: char, close: char) -> Vec<&str> {
    let mut input = line;
    let mut groups = Vec::new();
    while let Ok(group) = enclosed(&mut input, open, close) {
        groups.push(group);
    }
    groups
}

/// Units of a table header, within parenthesis, brackets, or space separated
pub(crate) fn detect_units(line: &str, columns: usize) -> Vec<String> {
    for (open, close) in [('(', ')'), ('[', ']')] {
        let balanced = line.matches(open).count() == line.matches(close).count();
        if balanced && line.matches(open).count() >= columns {
            return enclosed_groups(line, open, close)
                .into_iter()
                .map(|u| u.trim().to_string())
                .collect();
        }
    }
    line.split_whitespace().map(str::to_string).collect()
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First word of a section header and what follows it
pub(crate) fn first_word(line: &str) -> Option<(&str, &str)> {
    let mut input = line;
    let parsed: PResult<(&str, &str, &str)> = (
        take_till(0.., is_word),
        take_while(1.., is_word),
        take_till(0.., is_word),
    )
        .parse_next(&mut input);
    let (_, word, _) = parsed.ok()?;
    Some((word, input))
}
