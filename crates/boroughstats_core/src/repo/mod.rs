//! Repository layer over the loaded record set.
//!
//! # Responsibility
//! - Hold canonical records and the selected date window.
//! - Expose filter and aggregate queries as borrowed views and scalars.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotLoaded`, `WindowNotSet`) in
//!   addition to load failures.
//! - Empty-but-valid results are `Ok`, never errors.

pub mod record_repo;
pub mod region_index;
