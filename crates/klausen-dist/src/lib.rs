#![deny(missing_docs)]
//! Distribution adapter for the klausen sampling engine.
//!
//! Turns raw stats-arrays style records ([`RawSpec`]) into validated
//! [`ParameterSpec`]s, and gives each spec a static representative value and
//! a seeded draw of `n` values that respects its support.

/// Supported families and their stats-arrays identifiers.
pub mod kind;
/// Unvalidated declaration records.
pub mod raw;
/// Representative values and random draws.
pub mod sample;
/// Validated parameter specifications.
pub mod spec;

pub use kind::{DistributionKind, UncertaintyType};
pub use raw::RawSpec;
pub use sample::{triangular_inverse_cdf, DrawOptions};
pub use spec::{Bounds, Distribution, ParameterSpec};
