use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::{DistributionKind, UncertaintyType};

/// Unvalidated declaration record, as read from YAML/JSON or built in code.
///
/// Field names follow stats-arrays. Unrecognized fields are ignored when
/// deserializing, and `NaN` is treated as "not provided" because that is how
/// stats-arrays encodes unused columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpec {
    /// Distribution family tag.
    #[serde(default)]
    pub uncertainty_type: Option<UncertaintyType>,
    /// Location: mean, log-space mean, mode, offset or alpha depending on family.
    #[serde(default)]
    pub loc: Option<f64>,
    /// Scale: standard deviation or scale factor depending on family.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Shape parameter (Weibull, Gamma) or beta (Beta).
    #[serde(default)]
    pub shape: Option<f64>,
    /// Lower bound of the support.
    #[serde(default)]
    pub minimum: Option<f64>,
    /// Upper bound of the support.
    #[serde(default)]
    pub maximum: Option<f64>,
    /// Observed population for empirical parameters.
    #[serde(default)]
    pub sample: Option<Vec<f64>>,
    /// Explicit static value, overriding the computed representative.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Free-form annotations carried alongside the parameter.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl RawSpec {
    /// Starts a record for the given family.
    pub fn new(kind: DistributionKind) -> Self {
        Self {
            uncertainty_type: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Constant parameter.
    pub fn constant(value: f64) -> Self {
        Self::new(DistributionKind::Constant).loc(value)
    }

    /// Normal parameter with mean `loc` and standard deviation `scale`.
    pub fn normal(loc: f64, scale: f64) -> Self {
        Self::new(DistributionKind::Normal).loc(loc).scale(scale)
    }

    /// Log-normal parameter with log-space mean `loc` and deviation `scale`.
    pub fn lognormal(loc: f64, scale: f64) -> Self {
        Self::new(DistributionKind::LogNormal).loc(loc).scale(scale)
    }

    /// Uniform parameter on `[minimum, maximum]`.
    pub fn uniform(minimum: f64, maximum: f64) -> Self {
        Self::new(DistributionKind::Uniform)
            .minimum(minimum)
            .maximum(maximum)
    }

    /// Triangular parameter with mode `loc`.
    pub fn triangular(minimum: f64, loc: f64, maximum: f64) -> Self {
        Self::new(DistributionKind::Triangular)
            .minimum(minimum)
            .loc(loc)
            .maximum(maximum)
    }

    /// Empirical parameter resampled from `sample`.
    pub fn empirical(sample: impl Into<Vec<f64>>) -> Self {
        Self {
            sample: Some(sample.into()),
            ..Self::new(DistributionKind::Empirical)
        }
    }

    /// Sets `loc`.
    pub fn loc(mut self, loc: f64) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Sets `scale`.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets `shape`.
    pub fn shape(mut self, shape: f64) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Sets `minimum`.
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets `maximum`.
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Sets `amount`.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
