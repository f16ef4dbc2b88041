//! Pure statistics over record sequences.
//!
//! # Responsibility
//! - Compute window aggregates, newest-known lookups and chart totals.
//! - Stay independent of repository state so every function is testable with
//!   a plain slice of records.
//!
//! # Invariants
//! - Unknown values are excluded from every aggregate; they never count as zero.
//! - An empty input is reported as a distinct outcome, never divided by.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod aggregate;
pub mod band;
pub mod compare;
pub mod latest;

pub type StatsResult<T> = Result<T, StatsError>;

/// Errors from statistics lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Input was empty or every candidate value was unknown.
    NoKnownValue,
}

impl Display for StatsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoKnownValue => write!(f, "no record carries a known value"),
        }
    }
}

impl Error for StatsError {}
