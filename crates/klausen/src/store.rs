use indexmap::IndexMap;
use klausen_core::{ErrorInfo, KlausenError};
use serde::{Deserialize, Serialize};

use crate::value::ParameterValue;
use crate::NamedValues;

/// Global mode of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Mode {
    /// No values computed yet.
    Uninitialized,
    /// One representative scalar per parameter.
    Static,
    /// One vector of `iterations` trials per parameter.
    Stochastic {
        /// Joint trial count shared by every parameter.
        iterations: usize,
    },
}

impl Mode {
    /// Trial count in stochastic mode.
    pub fn iterations(&self) -> Option<usize> {
        match self {
            Mode::Stochastic { iterations } => Some(*iterations),
            Mode::Uninitialized | Mode::Static => None,
        }
    }
}

/// Complete set of values produced by one mode transition.
///
/// A store is never edited after construction; the engine swaps in a new one
/// on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStore {
    mode: Mode,
    seed: Option<u64>,
    values: IndexMap<String, ParameterValue>,
}

impl SampleStore {
    pub(crate) fn new_static(values: IndexMap<String, ParameterValue>) -> Self {
        Self {
            mode: Mode::Static,
            seed: None,
            values,
        }
    }

    pub(crate) fn new_stochastic(
        iterations: usize,
        seed: Option<u64>,
        values: IndexMap<String, ParameterValue>,
    ) -> Self {
        debug_assert!(values
            .values()
            .all(|value| value.trial_count() == Some(iterations)));
        Self {
            mode: Mode::Stochastic { iterations },
            seed,
            values,
        }
    }

    /// [`Mode::Static`] or [`Mode::Stochastic`].
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Seed of the random stream, when the draw was seeded by the engine.
    /// `None` for static stores and for draws from a caller-supplied RNG.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of trials: one for a static store.
    pub fn trial_count(&self) -> usize {
        self.mode.iterations().unwrap_or(1)
    }

    /// Value stored for `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Number of parameters held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the store holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &ParameterValue)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Values of every parameter for trial `index`, in declaration order.
    ///
    /// This is the row exporters use to build per-trial substitution tables.
    pub fn trial(&self, index: usize) -> Option<IndexMap<&str, f64>> {
        if index >= self.trial_count() {
            return None;
        }
        self.values
            .iter()
            .map(|(name, value)| value.at(index).map(|v| (name.as_str(), v)))
            .collect()
    }

    /// Every trial row in order.
    pub fn trials(&self) -> impl Iterator<Item = IndexMap<&str, f64>> + '_ {
        (0..self.trial_count()).filter_map(move |index| self.trial(index))
    }
}

impl NamedValues for SampleStore {
    fn value(&self, name: &str) -> Result<&ParameterValue, KlausenError> {
        self.get(name).ok_or_else(|| unknown_parameter(name))
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}

pub(crate) fn unknown_parameter(name: &str) -> KlausenError {
    KlausenError::UnknownParameter(
        ErrorInfo::new("engine-unknown-parameter", "parameter was never declared")
            .with_context("parameter", name),
    )
}
