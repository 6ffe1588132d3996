use std::borrow::Borrow;

use indexmap::map::Entry;
use indexmap::IndexMap;
use klausen_core::{ErrorInfo, KlausenError};
use klausen_dist::{ParameterSpec, RawSpec};
use tracing::debug;

/// Immutable, insertion-ordered set of declared parameters.
///
/// Iteration order is declaration order and fixes the order in which
/// parameters consume the shared random stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    specs: IndexMap<String, ParameterSpec>,
}

impl Registry {
    /// Validates every raw record, then builds the registry.
    ///
    /// All-or-nothing: the first invalid record (or empty / duplicate name)
    /// fails the whole declaration with [`KlausenError::Specification`].
    pub fn declare<I, K, R>(declarations: I) -> Result<Self, KlausenError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Borrow<RawSpec>,
    {
        Self::from_specs(declarations.into_iter().map(|(name, raw)| {
            let name = name.into();
            let spec = ParameterSpec::from_raw(raw.borrow())
                .map_err(|err| err.with_context("parameter", name.as_str()));
            (name, spec)
        }))
    }

    /// Builds a registry from specs constructed directly.
    ///
    /// Each spec goes through [`ParameterSpec::validate`], so a hand-built or
    /// deserialized spec is held to the same rules as a declared one.
    pub fn from_validated<I, K>(specs: I) -> Result<Self, KlausenError>
    where
        I: IntoIterator<Item = (K, ParameterSpec)>,
        K: Into<String>,
    {
        Self::from_specs(specs.into_iter().map(|(name, spec)| {
            let name = name.into();
            let checked = spec
                .validate()
                .map(|()| spec)
                .map_err(|err| err.with_context("parameter", name.as_str()));
            (name, checked)
        }))
    }

    fn from_specs<I>(entries: I) -> Result<Self, KlausenError>
    where
        I: IntoIterator<Item = (String, Result<ParameterSpec, KlausenError>)>,
    {
        let mut specs = IndexMap::new();
        for (name, spec) in entries {
            if name.is_empty() {
                return Err(KlausenError::Specification(
                    ErrorInfo::new("spec-empty-name", "parameter names must be non-empty")
                        .with_context("position", specs.len().to_string()),
                ));
            }
            let spec = spec?;
            match specs.entry(name) {
                Entry::Occupied(entry) => {
                    return Err(KlausenError::Specification(
                        ErrorInfo::new("spec-duplicate-name", "parameter declared twice")
                            .with_context("parameter", entry.key().as_str()),
                    ));
                }
                Entry::Vacant(entry) => {
                    entry.insert(spec);
                }
            }
        }
        debug!(parameters = specs.len(), "declared parameter registry");
        Ok(Self { specs })
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether `name` was declared. Names are case-sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Spec declared under `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.get(name)
    }

    /// `(name, spec)` pairs in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &ParameterSpec)> + '_ {
        self.specs.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.specs.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a ParameterSpec);
    type IntoIter = indexmap::map::Iter<'a, String, ParameterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
