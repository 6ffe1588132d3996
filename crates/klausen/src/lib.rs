#![deny(missing_docs)]
//! Named-parameter Monte Carlo sampling engine.
//!
//! Declare uncertain scalar inputs by name, draw joint Monte Carlo trials for
//! all of them with [`Engine::stochastic`], or freeze them to representative
//! values with [`Engine::static_values`]. A downstream model reads every
//! parameter by name through [`NamedValues`] and gets a
//! [`ParameterValue`] whose shape follows the engine's mode.
//!
//! ```
//! use klausen::{Engine, RawSpec};
//!
//! let mut engine = Engine::declare([
//!     ("a", RawSpec::constant(2.0)),
//!     ("b", RawSpec::triangular(2.0, 3.0, 4.0)),
//! ])
//! .unwrap();
//!
//! engine.static_values();
//! assert_eq!(&engine["a"] * &engine["b"], 6.0);
//!
//! engine.stochastic(1000, Some(7)).unwrap();
//! assert_eq!((&engine["a"] * &engine["b"]).trial_count(), Some(1000));
//! ```

use std::ops::Index;

/// Engine settings and declaration file loading.
pub mod config;
/// Mode controller and name-keyed access.
pub mod engine;
/// Validated, ordered parameter declarations.
pub mod registry;
/// Values produced by one mode transition.
pub mod store;
/// Scalar-or-vector parameter values with broadcasting arithmetic.
pub mod value;

pub use config::{
    declaration_from_json_str, declaration_from_yaml_str, load_config, load_declaration,
    Declaration, EngineConfig, SeedPolicy, TruncationConfig,
};
pub use engine::Engine;
pub use klausen_core::{ErrorInfo, KlausenError, RngHandle};
pub use klausen_dist::{Distribution, DistributionKind, ParameterSpec, RawSpec, UncertaintyType};
pub use registry::Registry;
pub use store::{Mode, SampleStore};
pub use value::ParameterValue;

/// Name-keyed view of parameter values, as consumed by a downstream model.
pub trait NamedValues {
    /// Current value of `name`.
    fn value(&self, name: &str) -> Result<&ParameterValue, KlausenError>;

    /// Mode the values were produced in.
    fn mode(&self) -> Mode;
}

impl Index<&str> for dyn NamedValues + '_ {
    type Output = ParameterValue;

    fn index(&self, name: &str) -> &ParameterValue {
        match self.value(name) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Downstream numeric model evaluated against a [`NamedValues`] view.
///
/// The same model runs in static and stochastic mode; its output carries the
/// trial dimension of whatever it reads.
pub trait Model {
    /// Model result, typically a [`ParameterValue`].
    type Output;

    /// Evaluates the model.
    fn evaluate(&self, params: &dyn NamedValues) -> Result<Self::Output, KlausenError>;
}

impl<F, O> Model for F
where
    F: Fn(&dyn NamedValues) -> Result<O, KlausenError>,
{
    type Output = O;

    fn evaluate(&self, params: &dyn NamedValues) -> Result<O, KlausenError> {
        self(params)
    }
}
