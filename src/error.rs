use std::error::Error;
use std::fmt;

/// Reasons a line is not accepted as a timestamp.
///
/// These never abort a conversion; the line is kept as caption text instead.
#[derive(Debug, PartialEq)]
pub enum TimestampError {
    Malformed,
    ComponentCount(usize),
    ComponentWidth(&'static str, String),
    OutOfRange(&'static str, u64),
    Overflow,
}

impl Error for TimestampError {}

impl fmt::Display for TimestampError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimestampError::Malformed => write!(fmt, "not a colon-separated list of numbers"),
            TimestampError::ComponentCount(count) => {
                write!(fmt, "unsupported number of components: {}", count)
            }
            TimestampError::ComponentWidth(unit, value) => {
                write!(fmt, "{} component '{}' must be two digits", unit, value)
            }
            TimestampError::OutOfRange(unit, value) => {
                write!(fmt, "{} component {} is out of range (0-59)", unit, value)
            }
            TimestampError::Overflow => write!(fmt, "value does not fit in a second count"),
        }
    }
}
