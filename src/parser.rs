use crate::error::TimestampError;
use crate::srt::{CaptionBlock, Line};

use std::time::Duration;

use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, opt};
use nom::multi::separated_list1;
use nom::IResult;
use tracing::{debug, trace};

/// Strict accepts `M:SS` and `H:MM:SS` with non-leading components below 60.
/// Lenient accepts one to three components of any width and lets overflowing
/// minutes and seconds carry into the larger units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    Strict,
    Lenient,
}

pub struct Parser {
    validation: Validation,
}

enum State {
    AwaitingTimestamp,
    AccumulatingCaption { show_at: Duration, text: Vec<String> },
}

impl Parser {
    pub fn new(validation: Validation) -> Self {
        Self { validation }
    }

    /// Groups transcript lines into caption blocks.
    ///
    /// Each block starts at a timestamp line and collects the caption lines that
    /// follow it. The next timestamp line is recorded as `next_at` and starts
    /// the following block. Timestamps without caption text produce no block.
    pub fn parse(&self, input: &str) -> Vec<CaptionBlock> {
        let input = strip_bom(input);
        let mut blocks = Vec::new();
        let mut state = State::AwaitingTimestamp;

        for (idx, raw) in input.trim().lines().enumerate() {
            state = match (state, classify(raw, self.validation)) {
                (State::AwaitingTimestamp, Line::Timestamp(show_at)) => {
                    State::AccumulatingCaption {
                        show_at,
                        text: Vec::new(),
                    }
                }
                (State::AwaitingTimestamp, Line::Caption(line)) => {
                    if !line.is_empty() {
                        debug!(line = idx + 1, text = line, "Dropping text before the first timestamp");
                    }
                    State::AwaitingTimestamp
                }
                (State::AccumulatingCaption { show_at, text }, Line::Timestamp(next_at)) => {
                    push_block(&mut blocks, show_at, Some(next_at), text);
                    State::AccumulatingCaption {
                        show_at: next_at,
                        text: Vec::new(),
                    }
                }
                (State::AccumulatingCaption { show_at, mut text }, Line::Caption(line)) => {
                    if !line.is_empty() {
                        text.push(line.to_string());
                    }
                    State::AccumulatingCaption { show_at, text }
                }
            };
        }

        if let State::AccumulatingCaption { show_at, text } = state {
            push_block(&mut blocks, show_at, None, text);
        }
        blocks
    }
}

fn push_block(
    blocks: &mut Vec<CaptionBlock>,
    show_at: Duration,
    next_at: Option<Duration>,
    text: Vec<String>,
) {
    if text.is_empty() {
        debug!(?show_at, "Skipping timestamp without caption text");
        return;
    }
    blocks.push(CaptionBlock {
        show_at,
        next_at,
        text,
    });
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn strip_bom(input: &str) -> &str {
    match optional_bom(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

/// Decides whether a line is a timestamp. Anything that fails to parse is
/// caption text.
pub fn classify(line: &str, validation: Validation) -> Line<'_> {
    let line = line.trim();
    match parse_timestamp(line, validation) {
        Ok(ts) => Line::Timestamp(ts),
        Err(err) => {
            if err != TimestampError::Malformed {
                trace!(line, reason = %err, "Treating timestamp-like line as caption text");
            }
            Line::Caption(line)
        }
    }
}

fn components(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list1(char(':'), digit1))(input)
}

pub fn parse_timestamp(input: &str, validation: Validation) -> Result<Duration, TimestampError> {
    let parts = match components(input) {
        Ok((_, parts)) => parts,
        Err(_) => return Err(TimestampError::Malformed),
    };

    let (hours, minutes, seconds) = match (validation, parts.as_slice()) {
        (_, [m, s]) => (None, Some(*m), *s),
        (_, [h, m, s]) => (Some(*h), Some(*m), *s),
        (Validation::Lenient, [s]) => (None, None, *s),
        _ => return Err(TimestampError::ComponentCount(parts.len())),
    };

    if validation == Validation::Strict {
        check_sexagesimal("seconds", seconds)?;
        // The leading component may exceed 59, so minutes are only bounded
        // when hours are present.
        if let (Some(_), Some(m)) = (hours, minutes) {
            check_sexagesimal("minutes", m)?;
        }
    }

    let hours = number(hours)?;
    let minutes = number(minutes)?;
    let seconds = number(Some(seconds))?;

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .map(Duration::from_secs)
        .ok_or(TimestampError::Overflow)
}

fn check_sexagesimal(unit: &'static str, component: &str) -> Result<(), TimestampError> {
    if component.len() != 2 {
        return Err(TimestampError::ComponentWidth(unit, component.to_string()));
    }
    let value = number(Some(component))?;
    if value > 59 {
        return Err(TimestampError::OutOfRange(unit, value));
    }
    Ok(())
}

// Components are all digits at this point, so parsing only fails on overflow.
fn number(component: Option<&str>) -> Result<u64, TimestampError> {
    component.map_or(Ok(0), |c| c.parse().map_err(|_| TimestampError::Overflow))
}
