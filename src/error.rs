//! Errors raised by the numerical core.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The harmonic design matrix has more columns than rows.
    #[error("Cannot fit {harmonics} harmonics to {samples} samples: needs at least {columns}")]
    Underdetermined {
        samples: usize,
        harmonics: usize,
        columns: usize,
    },

    #[error("Cutoff of {harmonics} harmonics overlaps its mirror band for a series of length {len}")]
    CutoffTooHigh { harmonics: usize, len: usize },

    #[error("Series is empty")]
    EmptySeries,

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Normal equations of the harmonic design matrix are singular")]
    SingularDesign,

    #[error("Reference period starts on {start} after it ends on {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Dates must be strictly increasing: {previous} is followed by {next}")]
    UnsortedDates { previous: NaiveDate, next: NaiveDate },

    #[error("No grid cells fall inside the domain {0}")]
    EmptyDomain(String),

    #[error("Unknown {kind} `{name}`")]
    UnknownName { kind: &'static str, name: String },
}
