use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use klausen_core::{ErrorInfo, KlausenError, RngHandle};
use klausen_dist::RawSpec;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::{self, EngineConfig};
use crate::registry::Registry;
use crate::store::{unknown_parameter, Mode, SampleStore};
use crate::value::ParameterValue;
use crate::{Model, NamedValues};

/// Source of seeds for stochastic calls that do not pass one.
#[derive(Debug, Clone)]
enum SeedSource {
    Entropy,
    Master { seed: u64, next_substream: u64 },
}

impl SeedSource {
    fn from_config(config: &EngineConfig) -> Self {
        match config.seed_policy.master_seed {
            Some(seed) => SeedSource::Master {
                seed,
                next_substream: 0,
            },
            None => SeedSource::Entropy,
        }
    }

    fn next_rng(&mut self) -> RngHandle {
        match self {
            SeedSource::Entropy => RngHandle::from_entropy(),
            SeedSource::Master {
                seed,
                next_substream,
            } => {
                let rng = RngHandle::substream(*seed, *next_substream);
                *next_substream += 1;
                rng
            }
        }
    }
}

/// Named-parameter Monte Carlo engine.
///
/// Owns one [`Registry`] and, after the first transition, one
/// [`SampleStore`]. [`Engine::stochastic`] and [`Engine::static_values`]
/// compute a complete new store before replacing the old one, so a reader
/// never sees values from two different transitions. Transitions take
/// `&mut self`; share an engine across threads behind a `RwLock`.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Registry,
    config: EngineConfig,
    store: Option<Arc<SampleStore>>,
    seeds: SeedSource,
}

impl Engine {
    /// Engine with the default configuration.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    /// Engine over `registry` with explicit settings.
    pub fn with_config(registry: Registry, config: EngineConfig) -> Self {
        let seeds = SeedSource::from_config(&config);
        Self {
            registry,
            config,
            store: None,
            seeds,
        }
    }

    /// Validates `declarations` and builds an uninitialized engine.
    pub fn declare<I, K, R>(declarations: I) -> Result<Self, KlausenError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Borrow<RawSpec>,
    {
        Registry::declare(declarations).map(Self::new)
    }

    /// Builds an engine from a YAML or JSON declaration file.
    pub fn from_path(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, KlausenError> {
        let declaration = config::load_declaration(path)?;
        let registry = Registry::declare(declaration)?;
        Ok(Self::with_config(registry, config))
    }

    /// Declared parameters.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.store
            .as_ref()
            .map_or(Mode::Uninitialized, |store| store.mode())
    }

    /// Trial count when stochastic.
    pub fn iterations(&self) -> Option<usize> {
        self.mode().iterations()
    }

    /// Seed behind the current stochastic values, if the engine chose it.
    pub fn seed(&self) -> Option<u64> {
        self.store.as_ref().and_then(|store| store.seed())
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// True when no parameter was declared.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether `name` was declared.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.registry.names()
    }

    /// Draws `iterations` joint trials for every parameter.
    ///
    /// With `Some(seed)` the draw is reproducible from that seed alone.
    /// With `None` the seed comes from the configured [`config::SeedPolicy`].
    /// Parameters consume one shared stream in declaration order. On error
    /// the previous values stay in place.
    pub fn stochastic(&mut self, iterations: usize, seed: Option<u64>) -> Result<(), KlausenError> {
        let mut rng = match seed {
            Some(seed) => RngHandle::from_seed(seed),
            None => self.seeds.next_rng(),
        };
        let seed = rng.seed();
        self.redraw(iterations, &mut rng, Some(seed))
    }

    /// [`Engine::stochastic`] with [`EngineConfig::default_iterations`] trials.
    pub fn stochastic_default(&mut self, seed: Option<u64>) -> Result<(), KlausenError> {
        self.stochastic(self.config.default_iterations, seed)
    }

    /// Draws `iterations` joint trials from a caller-supplied random source.
    pub fn stochastic_with_rng<R: Rng + ?Sized>(
        &mut self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<(), KlausenError> {
        self.redraw(iterations, rng, None)
    }

    fn redraw<R: Rng + ?Sized>(
        &mut self,
        iterations: usize,
        rng: &mut R,
        seed: Option<u64>,
    ) -> Result<(), KlausenError> {
        if iterations == 0 {
            return Err(KlausenError::Specification(
                ErrorInfo::new("spec-zero-iterations", "iteration count must be positive")
                    .with_hint("pass at least one trial to `stochastic`"),
            ));
        }
        match self.draw_all(iterations, rng) {
            Ok(values) => {
                self.store = Some(Arc::new(SampleStore::new_stochastic(
                    iterations, seed, values,
                )));
                debug!(iterations, ?seed, parameters = self.len(), "stochastic values ready");
                Ok(())
            }
            Err(err) => {
                warn!(code = %err.info().code, "stochastic draw failed; keeping previous values");
                Err(err)
            }
        }
    }

    fn draw_all<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<IndexMap<String, ParameterValue>, KlausenError> {
        let options = self.config.truncation.draw_options();
        let mut values = IndexMap::with_capacity(self.registry.len());
        for (name, spec) in self.registry.iter() {
            trace!(parameter = name, kind = %spec.kind(), "drawing");
            let drawn = spec
                .draw_with(iterations, rng, &options)
                .map_err(|err| err.with_context("parameter", name))?;
            values.insert(name.to_string(), ParameterValue::Vector(drawn));
        }
        Ok(values)
    }

    /// Freezes every parameter at its representative value.
    pub fn static_values(&mut self) {
        let values = self
            .registry
            .iter()
            .map(|(name, spec)| (name.to_string(), ParameterValue::Scalar(spec.representative())))
            .collect();
        self.store = Some(Arc::new(SampleStore::new_static(values)));
        debug!(parameters = self.len(), "static values ready");
    }

    /// Current value of `name`.
    ///
    /// Fails with [`KlausenError::UnknownParameter`] for undeclared names and
    /// [`KlausenError::NotReady`] before the first transition.
    pub fn get(&self, name: &str) -> Result<&ParameterValue, KlausenError> {
        if !self.registry.contains(name) {
            return Err(unknown_parameter(name));
        }
        let store = self.store.as_ref().ok_or_else(|| {
            KlausenError::NotReady(not_ready_info().with_context("parameter", name))
        })?;
        store.get(name).ok_or_else(|| unknown_parameter(name))
    }

    /// Shared handle to the current store; stays valid across later transitions.
    pub fn snapshot(&self) -> Result<Arc<SampleStore>, KlausenError> {
        self.store.clone().ok_or_else(|| KlausenError::NotReady(not_ready_info()))
    }

    /// Metadata declared with `name`.
    pub fn metadata(&self, name: &str) -> Result<&BTreeMap<String, Value>, KlausenError> {
        self.registry
            .get(name)
            .map(|spec| &spec.metadata)
            .ok_or_else(|| unknown_parameter(name))
    }

    /// Runs `model` against the current values.
    pub fn evaluate<M: Model + ?Sized>(&self, model: &M) -> Result<M::Output, KlausenError> {
        if self.store.is_none() {
            return Err(KlausenError::NotReady(not_ready_info()));
        }
        model.evaluate(self)
    }
}

impl NamedValues for Engine {
    fn value(&self, name: &str) -> Result<&ParameterValue, KlausenError> {
        self.get(name)
    }

    fn mode(&self) -> Mode {
        Engine::mode(self)
    }
}

impl Index<&str> for Engine {
    type Output = ParameterValue;

    /// # Panics
    ///
    /// Panics where [`Engine::get`] returns an error.
    fn index(&self, name: &str) -> &ParameterValue {
        match self.get(name) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

fn not_ready_info() -> ErrorInfo {
    ErrorInfo::new(
        "engine-not-ready",
        "no values computed; call `static_values` or `stochastic` first",
    )
}
