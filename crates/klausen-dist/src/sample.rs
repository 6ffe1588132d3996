use klausen_core::{ErrorInfo, KlausenError};
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Beta, Distribution as _, Gamma, LogNormal, Normal, Weibull};
use serde::{Deserialize, Serialize};

use crate::spec::{Bounds, Distribution, ParameterSpec};

/// Tuning for the draw path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Rejection attempts allowed for each value of a truncated family.
    pub max_attempts: u32,
}

impl DrawOptions {
    /// Default rejection budget per drawn value.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ParameterSpec {
    /// Deterministic characteristic value used in static mode.
    ///
    /// Location for Normal, mode for Triangular, median for LogNormal and
    /// Weibull, mean for Gamma, Beta and empirical samples. An explicit
    /// `amount` takes precedence. The result is clipped into [`Self::bounds`].
    ///
    /// Gamma and Beta are the only families whose value is not the median:
    /// their closed-form mean is used instead, and the two differ for skewed
    /// shapes (Gamma with `shape = 2`, `scale = 1` has mean 2 and median
    /// about 1.68).
    pub fn representative(&self) -> f64 {
        let value = self.amount.unwrap_or_else(|| match &self.distribution {
            Distribution::Constant { value } => *value,
            Distribution::Normal { loc, .. } => *loc,
            Distribution::LogNormal { loc, .. } => loc.exp(),
            Distribution::Uniform {
                minimum,
                maximum,
                loc,
            } => loc.unwrap_or((minimum + maximum) / 2.0),
            Distribution::Triangular { mode, .. } => *mode,
            Distribution::Weibull {
                shape,
                scale,
                offset,
            } => offset + scale * std::f64::consts::LN_2.powf(1.0 / shape),
            Distribution::Gamma {
                shape,
                scale,
                offset,
            } => offset + shape * scale,
            Distribution::Beta {
                alpha,
                beta,
                minimum,
                maximum,
            } => minimum + (maximum - minimum) * alpha / (alpha + beta),
            Distribution::Empirical { sample } => {
                sample.iter().sum::<f64>() / sample.len() as f64
            }
        });
        self.bounds().clip(value)
    }

    /// Draws `n` values with the default [`DrawOptions`].
    pub fn draw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, KlausenError> {
        self.draw_with(n, rng, &DrawOptions::default())
    }

    /// Draws `n` values from the distribution.
    ///
    /// Truncated families are sampled by reject-and-redraw, so the conditional
    /// distribution inside the window keeps its shape. A value that cannot be
    /// placed inside the window within `options.max_attempts` tries fails the
    /// whole draw with [`KlausenError::Draw`].
    pub fn draw_with<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
        options: &DrawOptions,
    ) -> Result<Vec<f64>, KlausenError> {
        let window = self.truncation;
        match &self.distribution {
            Distribution::Constant { value } => Ok(vec![*value; n]),
            Distribution::Normal { loc, scale } => {
                let normal = Normal::new(*loc, *scale).map_err(|err| invalid(self, err))?;
                rejection(&normal, 0.0, window, n, rng, options)
            }
            Distribution::LogNormal { loc, scale } => {
                let lognormal = LogNormal::new(*loc, *scale).map_err(|err| invalid(self, err))?;
                rejection(&lognormal, 0.0, window, n, rng, options)
            }
            Distribution::Uniform {
                minimum, maximum, ..
            } => {
                let uniform = Uniform::new_inclusive(*minimum, *maximum);
                Ok((0..n).map(|_| uniform.sample(rng)).collect())
            }
            Distribution::Triangular {
                minimum,
                mode,
                maximum,
            } => Ok((0..n)
                .map(|_| triangular_inverse_cdf(*minimum, *mode, *maximum, rng.gen::<f64>()))
                .collect()),
            Distribution::Weibull {
                shape,
                scale,
                offset,
            } => {
                let weibull = Weibull::new(*scale, *shape).map_err(|err| invalid(self, err))?;
                rejection(&weibull, *offset, window, n, rng, options)
            }
            Distribution::Gamma {
                shape,
                scale,
                offset,
            } => {
                let gamma = Gamma::new(*shape, *scale).map_err(|err| invalid(self, err))?;
                rejection(&gamma, *offset, window, n, rng, options)
            }
            Distribution::Beta {
                alpha,
                beta,
                minimum,
                maximum,
            } => {
                let beta = Beta::new(*alpha, *beta).map_err(|err| invalid(self, err))?;
                let width = maximum - minimum;
                Ok((0..n).map(|_| minimum + width * beta.sample(rng)).collect())
            }
            Distribution::Empirical { sample } => {
                let index = Uniform::new(0, sample.len());
                Ok((0..n).map(|_| sample[index.sample(rng)]).collect())
            }
        }
    }
}

fn rejection<D, R>(
    base: &D,
    offset: f64,
    window: Bounds,
    n: usize,
    rng: &mut R,
    options: &DrawOptions,
) -> Result<Vec<f64>, KlausenError>
where
    D: rand_distr::Distribution<f64>,
    R: Rng + ?Sized,
{
    if window.is_unbounded() {
        return Ok((0..n).map(|_| offset + base.sample(rng)).collect());
    }
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let mut accepted = None;
        for _ in 0..options.max_attempts {
            let candidate = offset + base.sample(rng);
            if window.contains(candidate) {
                accepted = Some(candidate);
                break;
            }
        }
        match accepted {
            Some(value) => values.push(value),
            None => {
                let mut info = ErrorInfo::new(
                    "draw-rejection-exhausted",
                    "truncation window rejected every candidate",
                )
                .with_context("max_attempts", options.max_attempts.to_string())
                .with_hint("widen [minimum, maximum] or move it towards the bulk of the distribution");
                if let Some(min) = window.minimum {
                    info = info.with_context("minimum", min.to_string());
                }
                if let Some(max) = window.maximum {
                    info = info.with_context("maximum", max.to_string());
                }
                return Err(KlausenError::Draw(info));
            }
        }
    }
    Ok(values)
}

/// Inverse CDF of the triangular distribution evaluated at `u` in `[0, 1)`.
pub fn triangular_inverse_cdf(minimum: f64, mode: f64, maximum: f64, u: f64) -> f64 {
    let width = maximum - minimum;
    if width <= 0.0 {
        return minimum;
    }
    let split = (mode - minimum) / width;
    if u < split {
        minimum + (u * width * (mode - minimum)).sqrt()
    } else {
        maximum - ((1.0 - u) * width * (maximum - mode)).sqrt()
    }
}

fn invalid(spec: &ParameterSpec, err: impl std::fmt::Display) -> KlausenError {
    KlausenError::Draw(
        ErrorInfo::new("draw-invalid-parameters", err.to_string())
            .with_context("kind", spec.kind().as_str()),
    )
}
