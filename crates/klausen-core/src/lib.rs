#![deny(missing_docs)]
//! Error taxonomy and deterministic randomness shared by the klausen crates.

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, KlausenError};
pub use rng::{derive_substream_seed, RngHandle};

/// Result alias used throughout the workspace.
pub type Result<T, E = KlausenError> = std::result::Result<T, E>;
