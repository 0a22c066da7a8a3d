// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Parsing of number lists and ranges in selection queries.

use crate::errors::SelectError;

/// A number token: either a plain number or a range separator.
#[derive(Debug, PartialEq)]
enum NumberToken {
    Number(usize),
    Dash,
}

/// Parse a list of number tokens into inclusive ranges.
///
/// Accepts plain numbers (`5`), ranges (`3-7`, `3 - 7`; the keyword `to` is
/// rewritten to `-` before this function is called), and any combination of
/// these (`1 3-7 12`). A plain number `n` becomes the range `(n, n)`.
pub(crate) fn parse_numbers(tokens: &[String]) -> Result<Vec<(usize, usize)>, SelectError> {
    let mut items = Vec::new();

    // tokens may fuse numbers and dashes (`3-7`, `3-`, `-7`)
    for token in tokens {
        let mut digits = String::new();

        for c in token.chars() {
            match c {
                '0'..='9' => digits.push(c),
                '-' => {
                    if !digits.is_empty() {
                        items.push(NumberToken::Number(parse_number(&digits)?));
                        digits.clear();
                    }
                    items.push(NumberToken::Dash);
                }
                _ => return Err(SelectError::InvalidNumber(token.to_string())),
            }
        }

        if !digits.is_empty() {
            items.push(NumberToken::Number(parse_number(&digits)?));
        }
    }

    collect_ranges(&items)
}

fn parse_number(digits: &str) -> Result<usize, SelectError> {
    digits
        .parse::<usize>()
        .map_err(|_| SelectError::InvalidNumber(digits.to_string()))
}

/// Fold a token stream into ranges. A dash must be surrounded by numbers.
fn collect_ranges(items: &[NumberToken]) -> Result<Vec<(usize, usize)>, SelectError> {
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < items.len() {
        match items[i] {
            NumberToken::Number(start) => {
                if items.get(i + 1) == Some(&NumberToken::Dash) {
                    match items.get(i + 2) {
                        Some(NumberToken::Number(end)) => {
                            if *end < start {
                                return Err(SelectError::InvalidNumber(format!(
                                    "{}-{}",
                                    start, end
                                )));
                            }
                            ranges.push((start, *end));
                            i += 3;
                        }
                        _ => return Err(SelectError::InvalidNumber("-".to_string())),
                    }
                } else {
                    ranges.push((start, start));
                    i += 1;
                }
            }
            NumberToken::Dash => return Err(SelectError::InvalidNumber("-".to_string())),
        }
    }

    if ranges.is_empty() {
        return Err(SelectError::EmptyArgument("".to_string()));
    }

    Ok(ranges)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
