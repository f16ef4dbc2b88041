//! Domain model for region/date observations.
//!
//! # Responsibility
//! - Define the canonical record shape consumed by every query.
//! - Keep the borough code dictionary next to the data it names.
//!
//! # Invariants
//! - Unknown measurements are modelled as `None`, never as a magic value.

pub mod record;
pub mod region;
