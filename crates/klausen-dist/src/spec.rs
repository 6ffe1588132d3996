use std::collections::BTreeMap;

use klausen_core::{ErrorInfo, KlausenError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::DistributionKind;
use crate::raw::RawSpec;

/// Optional support window `[minimum, maximum]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
}

impl Bounds {
    /// Window with both ends set.
    pub fn closed(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    /// True when neither end is set.
    pub fn is_unbounded(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none()
    }

    /// Whether `value` lies inside the window (ends inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.minimum.map_or(true, |min| value >= min) && self.maximum.map_or(true, |max| value <= max)
    }

    /// Clips `value` to the nearest bound.
    pub fn clip(&self, value: f64) -> f64 {
        let value = self.minimum.map_or(value, |min| value.max(min));
        self.maximum.map_or(value, |max| value.min(max))
    }
}

/// Validated distribution with its family-specific parameters.
///
/// Parametric and empirical representations are separate variants, so a
/// value of this type can never carry both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Distribution {
    /// Every draw equals `value`.
    Constant {
        /// The fixed value.
        value: f64,
    },
    /// Normal distribution.
    Normal {
        /// Mean.
        loc: f64,
        /// Standard deviation.
        scale: f64,
    },
    /// Log-normal distribution, parameterized in log space.
    LogNormal {
        /// Mean of the underlying normal.
        loc: f64,
        /// Standard deviation of the underlying normal.
        scale: f64,
    },
    /// Continuous uniform distribution.
    Uniform {
        /// Lower end.
        minimum: f64,
        /// Upper end.
        maximum: f64,
        /// Optional declared location used as the static value.
        loc: Option<f64>,
    },
    /// Triangular distribution.
    Triangular {
        /// Lower end.
        minimum: f64,
        /// Mode.
        mode: f64,
        /// Upper end.
        maximum: f64,
    },
    /// Weibull distribution shifted by `offset`.
    Weibull {
        /// Shape `k`.
        shape: f64,
        /// Scale `lambda`.
        scale: f64,
        /// Additive offset.
        offset: f64,
    },
    /// Gamma distribution shifted by `offset`.
    Gamma {
        /// Shape `k`.
        shape: f64,
        /// Scale `theta`.
        scale: f64,
        /// Additive offset.
        offset: f64,
    },
    /// Beta distribution rescaled onto `[minimum, maximum]`.
    Beta {
        /// First shape parameter.
        alpha: f64,
        /// Second shape parameter.
        beta: f64,
        /// Lower end after rescaling.
        minimum: f64,
        /// Upper end after rescaling.
        maximum: f64,
    },
    /// Bootstrap resampling of an observed population.
    Empirical {
        /// Non-empty population.
        sample: Vec<f64>,
    },
}

impl Distribution {
    /// Family tag of the distribution.
    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::Constant { .. } => DistributionKind::Constant,
            Distribution::Normal { .. } => DistributionKind::Normal,
            Distribution::LogNormal { .. } => DistributionKind::LogNormal,
            Distribution::Uniform { .. } => DistributionKind::Uniform,
            Distribution::Triangular { .. } => DistributionKind::Triangular,
            Distribution::Weibull { .. } => DistributionKind::Weibull,
            Distribution::Gamma { .. } => DistributionKind::Gamma,
            Distribution::Beta { .. } => DistributionKind::Beta,
            Distribution::Empirical { .. } => DistributionKind::Empirical,
        }
    }
}

/// Validated declaration of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Family and parameters.
    pub distribution: Distribution,
    /// Truncation window for families that support it.
    #[serde(default)]
    pub truncation: Bounds,
    /// Explicit static value overriding the computed representative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Annotations that travel with the parameter.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl ParameterSpec {
    /// Wraps a distribution with no truncation, amount or metadata.
    pub fn new(distribution: Distribution) -> Self {
        Self {
            distribution,
            truncation: Bounds::default(),
            amount: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Family tag of the parameter.
    pub fn kind(&self) -> DistributionKind {
        self.distribution.kind()
    }

    /// Effective support window: intrinsic for bounded families, the
    /// truncation window for truncatable ones, unbounded otherwise.
    pub fn bounds(&self) -> Bounds {
        match &self.distribution {
            Distribution::Uniform {
                minimum, maximum, ..
            }
            | Distribution::Triangular {
                minimum, maximum, ..
            }
            | Distribution::Beta {
                minimum, maximum, ..
            } => Bounds::closed(*minimum, *maximum),
            Distribution::Normal { .. }
            | Distribution::LogNormal { .. }
            | Distribution::Weibull { .. }
            | Distribution::Gamma { .. } => self.truncation,
            Distribution::Constant { .. } | Distribution::Empirical { .. } => Bounds::default(),
        }
    }

    /// Validates a raw record.
    ///
    /// Every check happens here so that drawing never fails on a malformed
    /// declaration.
    pub fn from_raw(raw: &RawSpec) -> Result<Self, KlausenError> {
        let kind = raw
            .uncertainty_type
            .as_ref()
            .ok_or_else(|| missing("uncertainty_type", None))?
            .resolve()?;
        let fields = Fields::normalize(raw, kind)?;

        if kind == DistributionKind::Empirical {
            if fields.has_parametric() {
                return Err(conflict(kind, "parametric fields set on an empirical parameter"));
            }
        } else if raw.sample.is_some() {
            return Err(conflict(kind, "`sample` is only valid for empirical parameters"));
        }

        if let (Some(min), Some(max)) = (fields.minimum, fields.maximum) {
            if min > max {
                return Err(KlausenError::Specification(
                    ErrorInfo::new("spec-bounds-inverted", "minimum is greater than maximum")
                        .with_context("kind", kind.as_str())
                        .with_context("minimum", min.to_string())
                        .with_context("maximum", max.to_string()),
                ));
            }
        }

        let distribution = match kind {
            DistributionKind::Constant => Distribution::Constant {
                value: fields
                    .loc
                    .or(fields.amount)
                    .ok_or_else(|| missing("loc", Some(kind)))?,
            },
            DistributionKind::Normal => Distribution::Normal {
                loc: fields.require_loc(kind)?,
                scale: positive("scale", fields.scale, kind)?,
            },
            DistributionKind::LogNormal => Distribution::LogNormal {
                loc: fields.require_loc(kind)?,
                scale: positive("scale", fields.scale, kind)?,
            },
            DistributionKind::Uniform => {
                let (minimum, maximum) = fields.require_bounds(kind)?;
                if let Some(loc) = fields.loc {
                    within(loc, minimum, maximum, kind)?;
                }
                Distribution::Uniform {
                    minimum,
                    maximum,
                    loc: fields.loc,
                }
            }
            DistributionKind::Triangular => {
                let (minimum, maximum) = fields.require_bounds(kind)?;
                let mode = fields.require_loc(kind)?;
                within(mode, minimum, maximum, kind)?;
                Distribution::Triangular {
                    minimum,
                    mode,
                    maximum,
                }
            }
            DistributionKind::Weibull => Distribution::Weibull {
                shape: positive("shape", fields.shape, kind)?,
                scale: positive("scale", fields.scale.or(Some(1.0)), kind)?,
                offset: fields.loc.unwrap_or(0.0),
            },
            DistributionKind::Gamma => Distribution::Gamma {
                shape: positive("shape", fields.shape, kind)?,
                scale: positive("scale", fields.scale.or(Some(1.0)), kind)?,
                offset: fields.loc.unwrap_or(0.0),
            },
            DistributionKind::Beta => {
                let minimum = fields.minimum.unwrap_or(0.0);
                let maximum = fields.maximum.unwrap_or(1.0);
                span(minimum, maximum, kind, Span::Open)?;
                Distribution::Beta {
                    alpha: positive("loc", fields.loc, kind)?,
                    beta: positive("shape", fields.shape, kind)?,
                    minimum,
                    maximum,
                }
            }
            DistributionKind::Empirical => {
                let sample = raw.sample.clone().unwrap_or_default();
                if sample.is_empty() {
                    return Err(KlausenError::Specification(
                        ErrorInfo::new("spec-empty-sample", "empirical sample is empty")
                            .with_context("kind", kind.as_str()),
                    ));
                }
                if let Some(bad) = sample.iter().find(|value| !value.is_finite()) {
                    return Err(KlausenError::Specification(
                        ErrorInfo::new("spec-non-finite", "empirical sample has a non-finite entry")
                            .with_context("value", bad.to_string()),
                    ));
                }
                Distribution::Empirical { sample }
            }
        };

        let mut spec = ParameterSpec::new(distribution);
        if kind.supports_truncation() {
            spec.truncation = Bounds {
                minimum: fields.minimum,
                maximum: fields.maximum,
            };
        }
        spec.amount = fields.amount;
        spec.metadata = raw.metadata.clone();
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the invariants every draw relies on.
    ///
    /// [`ParameterSpec::from_raw`] only returns specs that pass; call this on
    /// specs built or deserialized directly.
    pub fn validate(&self) -> Result<(), KlausenError> {
        let kind = self.kind();
        match &self.distribution {
            Distribution::Constant { value } => finite("loc", *value, kind)?,
            Distribution::Normal { loc, scale } | Distribution::LogNormal { loc, scale } => {
                finite("loc", *loc, kind)?;
                positive("scale", Some(finite_value("scale", *scale, kind)?), kind)?;
            }
            Distribution::Uniform {
                minimum,
                maximum,
                loc,
            } => {
                span(*minimum, *maximum, kind, Span::Closed)?;
                if let Some(loc) = loc {
                    within(*loc, *minimum, *maximum, kind)?;
                }
            }
            Distribution::Triangular {
                minimum,
                mode,
                maximum,
            } => {
                span(*minimum, *maximum, kind, Span::Closed)?;
                within(*mode, *minimum, *maximum, kind)?;
            }
            Distribution::Weibull {
                shape,
                scale,
                offset,
            }
            | Distribution::Gamma {
                shape,
                scale,
                offset,
            } => {
                positive("shape", Some(finite_value("shape", *shape, kind)?), kind)?;
                positive("scale", Some(finite_value("scale", *scale, kind)?), kind)?;
                finite("loc", *offset, kind)?;
            }
            Distribution::Beta {
                alpha,
                beta,
                minimum,
                maximum,
            } => {
                positive("loc", Some(finite_value("loc", *alpha, kind)?), kind)?;
                positive("shape", Some(finite_value("shape", *beta, kind)?), kind)?;
                span(*minimum, *maximum, kind, Span::Open)?;
            }
            Distribution::Empirical { sample } => {
                if sample.is_empty() {
                    return Err(KlausenError::Specification(
                        ErrorInfo::new("spec-empty-sample", "empirical sample is empty")
                            .with_context("kind", kind.as_str()),
                    ));
                }
                for value in sample {
                    finite("sample", *value, kind)?;
                }
            }
        }
        if let Some(min) = self.truncation.minimum {
            finite("minimum", min, kind)?;
        }
        if let Some(max) = self.truncation.maximum {
            finite("maximum", max, kind)?;
        }
        if let (Some(min), Some(max)) = (self.truncation.minimum, self.truncation.maximum) {
            span(min, max, kind, Span::Closed)?;
        }
        if let Some(amount) = self.amount {
            finite("amount", amount, kind)?;
        }
        Ok(())
    }
}

impl TryFrom<&RawSpec> for ParameterSpec {
    type Error = KlausenError;

    fn try_from(raw: &RawSpec) -> Result<Self, Self::Error> {
        ParameterSpec::from_raw(raw)
    }
}

impl TryFrom<RawSpec> for ParameterSpec {
    type Error = KlausenError;

    fn try_from(raw: RawSpec) -> Result<Self, Self::Error> {
        ParameterSpec::from_raw(&raw)
    }
}

/// Numeric fields with `NaN` mapped to `None` and infinities rejected.
struct Fields {
    loc: Option<f64>,
    scale: Option<f64>,
    shape: Option<f64>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    amount: Option<f64>,
}

impl Fields {
    fn normalize(raw: &RawSpec, kind: DistributionKind) -> Result<Self, KlausenError> {
        let field = |name: &str, value: Option<f64>| -> Result<Option<f64>, KlausenError> {
            match value {
                Some(v) if v.is_nan() => Ok(None),
                Some(v) if v.is_infinite() => Err(KlausenError::Specification(
                    ErrorInfo::new("spec-non-finite", "numeric field is infinite")
                        .with_context("field", name)
                        .with_context("kind", kind.as_str()),
                )),
                other => Ok(other),
            }
        };
        Ok(Self {
            loc: field("loc", raw.loc)?,
            scale: field("scale", raw.scale)?,
            shape: field("shape", raw.shape)?,
            minimum: field("minimum", raw.minimum)?,
            maximum: field("maximum", raw.maximum)?,
            amount: field("amount", raw.amount)?,
        })
    }

    fn has_parametric(&self) -> bool {
        self.loc.is_some()
            || self.scale.is_some()
            || self.shape.is_some()
            || self.minimum.is_some()
            || self.maximum.is_some()
    }

    fn require_loc(&self, kind: DistributionKind) -> Result<f64, KlausenError> {
        self.loc.ok_or_else(|| missing("loc", Some(kind)))
    }

    fn require_bounds(&self, kind: DistributionKind) -> Result<(f64, f64), KlausenError> {
        let minimum = self.minimum.ok_or_else(|| missing("minimum", Some(kind)))?;
        let maximum = self.maximum.ok_or_else(|| missing("maximum", Some(kind)))?;
        span(minimum, maximum, kind, Span::Closed)?;
        Ok((minimum, maximum))
    }
}

fn missing(field: &str, kind: Option<DistributionKind>) -> KlausenError {
    let mut info = ErrorInfo::new("spec-missing-field", format!("required field `{field}` is missing"))
        .with_context("field", field);
    if let Some(kind) = kind {
        info = info.with_context("kind", kind.as_str());
    }
    KlausenError::Specification(info)
}

fn positive(field: &str, value: Option<f64>, kind: DistributionKind) -> Result<f64, KlausenError> {
    let value = value.ok_or_else(|| missing(field, Some(kind)))?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(KlausenError::Specification(
            ErrorInfo::new("spec-non-positive", format!("`{field}` must be positive"))
                .with_context("field", field)
                .with_context("kind", kind.as_str())
                .with_context("value", value.to_string()),
        ))
    }
}

fn within(loc: f64, minimum: f64, maximum: f64, kind: DistributionKind) -> Result<(), KlausenError> {
    if (minimum..=maximum).contains(&loc) {
        Ok(())
    } else {
        Err(KlausenError::Specification(
            ErrorInfo::new("spec-loc-out-of-bounds", "loc lies outside [minimum, maximum]")
                .with_context("kind", kind.as_str())
                .with_context("loc", loc.to_string())
                .with_context("minimum", minimum.to_string())
                .with_context("maximum", maximum.to_string()),
        ))
    }
}

/// Whether a support may collapse to a single point.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Span {
    Closed,
    Open,
}

/// Rejects inverted bounds and supports whose width overflows `f64`.
fn span(minimum: f64, maximum: f64, kind: DistributionKind, support: Span) -> Result<(), KlausenError> {
    let inverted = match support {
        Span::Closed => minimum > maximum,
        Span::Open => minimum >= maximum,
    };
    if inverted {
        return Err(KlausenError::Specification(
            ErrorInfo::new("spec-bounds-inverted", "minimum is not below maximum")
                .with_context("kind", kind.as_str())
                .with_context("minimum", minimum.to_string())
                .with_context("maximum", maximum.to_string()),
        ));
    }
    if !(maximum - minimum).is_finite() {
        return Err(KlausenError::Specification(
            ErrorInfo::new("spec-non-finite", "width of [minimum, maximum] overflows")
                .with_context("kind", kind.as_str())
                .with_context("minimum", minimum.to_string())
                .with_context("maximum", maximum.to_string())
                .with_hint("rescale the parameter so its support fits in f64"),
        ));
    }
    Ok(())
}

fn finite(field: &str, value: f64, kind: DistributionKind) -> Result<(), KlausenError> {
    finite_value(field, value, kind).map(|_| ())
}

fn finite_value(field: &str, value: f64, kind: DistributionKind) -> Result<f64, KlausenError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(KlausenError::Specification(
            ErrorInfo::new("spec-non-finite", format!("`{field}` must be finite"))
                .with_context("field", field)
                .with_context("kind", kind.as_str())
                .with_context("value", value.to_string()),
        ))
    }
}

fn conflict(kind: DistributionKind, message: &str) -> KlausenError {
    KlausenError::Specification(
        ErrorInfo::new("spec-conflicting-representation", message).with_context("kind", kind.as_str()),
    )
}
