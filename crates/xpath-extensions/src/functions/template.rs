//! Positional template substitution with composite-format placeholders.
//!
//! Grammar: `{index[,alignment]}` where `index` selects a value and the
//! optional `alignment` pads it with spaces (positive right-aligns, negative
//! left-aligns). `{{` and `}}` are literal braces. A trailing format
//! specifier (`{0:N2}`) is parsed and ignored; values arrive as text.
use core::iter::Peekable;
use core::str::CharIndices;

use smallvec::SmallVec;

use crate::error::{Error, FormatSyntaxReason};

/// Upper bound for placeholder indices and alignment widths.
pub const MAX_PLACEHOLDER_VALUE: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { index: usize, alignment: isize, position: usize },
}

/// A parsed template, reusable across renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: SmallVec<[Segment; 4]>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut segments: SmallVec<[Segment; 4]> = SmallVec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();
        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    if chars.next_if(|&(_, c)| c == '{').is_some() {
                        literal.push('{');
                        continue;
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(core::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(source, pos, &mut chars)?);
                }
                '}' => {
                    if chars.next_if(|&(_, c)| c == '}').is_some() {
                        literal.push('}');
                        continue;
                    }
                    return Err(Error::format_syntax(
                        source,
                        pos,
                        FormatSyntaxReason::UnmatchedClosingBrace,
                    ));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { source: source.to_string(), segments })
    }

    /// Highest placeholder index referenced, `None` for a template without placeholders.
    pub fn max_index(&self) -> Option<usize> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder { index, .. } => Some(*index),
                Segment::Literal(_) => None,
            })
            .max()
    }

    /// Substitute `values` positionally. An index past the end of `values` fails.
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> Result<String, Error> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder { index, alignment, position } => {
                    let value = values.get(*index).ok_or_else(|| {
                        Error::format_syntax(
                            &self.source,
                            *position,
                            FormatSyntaxReason::IndexOutOfRange { index: *index, count: values.len() },
                        )
                    })?;
                    push_aligned(&mut out, value.as_ref(), *alignment);
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render in one step.
pub fn substitute<S: AsRef<str>>(template: &str, values: &[S]) -> Result<String, Error> {
    Template::parse(template)?.render(values)
}

fn push_aligned(out: &mut String, value: &str, alignment: isize) {
    let width = alignment.unsigned_abs();
    let len = value.chars().count();
    if len >= width {
        out.push_str(value);
        return;
    }
    let pad = width - len;
    if alignment > 0 {
        out.extend(core::iter::repeat_n(' ', pad));
        out.push_str(value);
    } else {
        out.push_str(value);
        out.extend(core::iter::repeat_n(' ', pad));
    }
}

fn skip_spaces(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|&(_, c)| c == ' ').is_some() {}
}

/// Reads decimal digits; `Ok(None)` when there are none.
fn parse_number(
    chars: &mut Peekable<CharIndices<'_>>,
    too_large: impl Fn() -> Error,
) -> Result<Option<usize>, Error> {
    let mut value: Option<usize> = None;
    while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_ascii_digit()) {
        let digit = c as usize - '0' as usize;
        let next = value.unwrap_or(0) * 10 + digit;
        if next >= MAX_PLACEHOLDER_VALUE {
            return Err(too_large());
        }
        value = Some(next);
    }
    Ok(value)
}

// `start` is the byte offset of the opening brace, already consumed.
fn parse_placeholder(
    source: &str,
    start: usize,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Segment, Error> {
    let err = |reason| Error::format_syntax(source, start, reason);

    let Some(index) = parse_number(chars, || err(FormatSyntaxReason::IndexTooLarge))? else {
        return Err(if chars.peek().is_none() {
            err(FormatSyntaxReason::UnterminatedPlaceholder)
        } else {
            err(FormatSyntaxReason::MissingIndex)
        });
    };
    skip_spaces(chars);

    let mut alignment: isize = 0;
    if chars.next_if(|&(_, c)| c == ',').is_some() {
        skip_spaces(chars);
        let negative = chars.next_if(|&(_, c)| c == '-').is_some();
        let width = parse_number(chars, || err(FormatSyntaxReason::InvalidAlignment))?
            .ok_or_else(|| err(FormatSyntaxReason::InvalidAlignment))?;
        // width < MAX_PLACEHOLDER_VALUE, so it fits
        #[allow(clippy::cast_possible_wrap)]
        let width = width as isize;
        alignment = if negative { -width } else { width };
        skip_spaces(chars);
    }

    match chars.next() {
        Some((_, '}')) => Ok(Segment::Placeholder { index, alignment, position: start }),
        Some((_, ':')) => {
            // specifier text up to the closing brace is skipped
            if chars.any(|(_, c)| c == '}') {
                Ok(Segment::Placeholder { index, alignment, position: start })
            } else {
                Err(err(FormatSyntaxReason::UnterminatedPlaceholder))
            }
        }
        _ => Err(err(FormatSyntaxReason::UnterminatedPlaceholder)),
    }
}
