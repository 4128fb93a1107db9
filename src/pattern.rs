//! Pattern-string parser.
//!
//! Parses the compact pattern printed by [`FormatDescriptor`]'s `Display`
//! back into a descriptor, so synthesis can start from a saved pattern
//! instead of re-scanning a corpus. The grammar is deliberately tiny:
//! literal bytes (with `\` escapes), `[s-e]` ranges, and `{n}` repetition
//! suffixes. This is not a regex engine.

use thiserror::Error;

use crate::infer::FormatDescriptor;
use crate::range::Range;

/// Characters that must be escaped when printed as literals.
pub fn is_reserved(byte: u8) -> bool {
    matches!(
        byte,
        b'\\' | b'[' | b'{' | b'(' | b')' | b'+' | b'*' | b'?' | b'.'
    )
}

/// Pattern parse error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("unexpected end of pattern")]
    UnexpectedEof,
    #[error("expected '{expected}' at byte {position}")]
    Expected { expected: char, position: usize },
    #[error("invalid repetition count: {0:?}")]
    InvalidRepetition(String),
    #[error("range bounds out of order: '{start}' > '{end}'")]
    ReversedRange { start: char, end: char },
    #[error("pattern must be ASCII")]
    NonAscii,
}

pub type PatternResult<T> = Result<T, PatternError>;

/// Parse a pattern string into a [`FormatDescriptor`].
pub fn parse_pattern(input: &str) -> PatternResult<FormatDescriptor> {
    let input = input.trim_end_matches('\n');
    if !input.is_ascii() {
        return Err(PatternError::NonAscii);
    }
    let bytes = input.as_bytes();

    let mut ranges = Vec::new();
    let mut offset = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                let start = next_byte(bytes, i + 1)?;
                expect(bytes, i + 2, b'-')?;
                let end = next_byte(bytes, i + 3)?;
                expect(bytes, i + 4, b']')?;
                i += 5;
                if start > end {
                    return Err(PatternError::ReversedRange {
                        start: start as char,
                        end: end as char,
                    });
                }
                let repetition = if bytes.get(i) == Some(&b'{') {
                    let close = bytes[i..]
                        .iter()
                        .position(|&b| b == b'}')
                        .ok_or(PatternError::UnexpectedEof)?
                        + i;
                    let digits = &input[i + 1..close];
                    i = close + 1;
                    digits
                        .parse::<usize>()
                        .ok()
                        .filter(|&n| n > 0)
                        .ok_or_else(|| PatternError::InvalidRepetition(digits.to_string()))?
                } else {
                    1
                };
                ranges.push(Range::new(start, end, offset, repetition));
                offset += repetition;
            }
            b'\\' => {
                let literal = next_byte(bytes, i + 1)?;
                ranges.push(Range::new(literal, literal, offset, 1));
                offset += 1;
                i += 2;
            }
            literal => {
                ranges.push(Range::new(literal, literal, offset, 1));
                offset += 1;
                i += 1;
            }
        }
    }
    Ok(FormatDescriptor::new(ranges, offset))
}

fn next_byte(bytes: &[u8], position: usize) -> PatternResult<u8> {
    bytes.get(position).copied().ok_or(PatternError::UnexpectedEof)
}

fn expect(bytes: &[u8], position: usize, expected: u8) -> PatternResult<()> {
    match bytes.get(position) {
        Some(&byte) if byte == expected => Ok(()),
        Some(_) => Err(PatternError::Expected {
            expected: expected as char,
            position,
        }),
        // Truncation is always reported as end-of-pattern, as for `\`.
        None => Err(PatternError::UnexpectedEof),
    }
}
