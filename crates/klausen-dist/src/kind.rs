use std::fmt;
use std::str::FromStr;

use klausen_core::{ErrorInfo, KlausenError};
use serde::{Deserialize, Serialize};

/// Closed set of supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionKind {
    /// Fixed value, no uncertainty.
    Constant,
    /// Log-normal; `loc` and `scale` are the mean and standard deviation in log space.
    LogNormal,
    /// Normal, optionally truncated.
    Normal,
    /// Continuous uniform on `[minimum, maximum]`.
    Uniform,
    /// Triangular with mode `loc`.
    Triangular,
    /// Weibull with `shape`, `scale` and offset `loc`.
    Weibull,
    /// Gamma with `shape`, `scale` and offset `loc`.
    Gamma,
    /// Beta with alpha `loc` and beta `shape`, rescaled onto `[minimum, maximum]`.
    Beta,
    /// Bootstrap resampling of an observed population.
    Empirical,
}

impl DistributionKind {
    /// All supported kinds in stats-arrays id order.
    pub const ALL: [DistributionKind; 9] = [
        DistributionKind::Constant,
        DistributionKind::LogNormal,
        DistributionKind::Normal,
        DistributionKind::Uniform,
        DistributionKind::Triangular,
        DistributionKind::Weibull,
        DistributionKind::Gamma,
        DistributionKind::Beta,
        DistributionKind::Empirical,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Constant => "constant",
            DistributionKind::LogNormal => "lognormal",
            DistributionKind::Normal => "normal",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Triangular => "triangular",
            DistributionKind::Weibull => "weibull",
            DistributionKind::Gamma => "gamma",
            DistributionKind::Beta => "beta",
            DistributionKind::Empirical => "empirical",
        }
    }

    /// Numeric identifier used by stats-arrays, if the family has one.
    pub fn stats_arrays_id(&self) -> Option<i64> {
        match self {
            DistributionKind::Constant => Some(1),
            DistributionKind::LogNormal => Some(2),
            DistributionKind::Normal => Some(3),
            DistributionKind::Uniform => Some(4),
            DistributionKind::Triangular => Some(5),
            DistributionKind::Weibull => Some(8),
            DistributionKind::Gamma => Some(9),
            DistributionKind::Beta => Some(10),
            DistributionKind::Empirical => None,
        }
    }

    /// Resolves a stats-arrays numeric identifier.
    pub fn from_stats_arrays_id(id: i64) -> Result<Self, KlausenError> {
        match id {
            0 | 1 => Ok(DistributionKind::Constant),
            2 => Ok(DistributionKind::LogNormal),
            3 => Ok(DistributionKind::Normal),
            4 => Ok(DistributionKind::Uniform),
            5 => Ok(DistributionKind::Triangular),
            8 => Ok(DistributionKind::Weibull),
            9 => Ok(DistributionKind::Gamma),
            10 => Ok(DistributionKind::Beta),
            other => Err(unknown_kind(other.to_string())),
        }
    }

    /// Whether `minimum`/`maximum` act as a rejection window for this family.
    pub fn supports_truncation(&self) -> bool {
        matches!(
            self,
            DistributionKind::Normal
                | DistributionKind::LogNormal
                | DistributionKind::Weibull
                | DistributionKind::Gamma
        )
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = KlausenError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "constant" | "undefined" | "none" | "nouncertainty" => Ok(DistributionKind::Constant),
            "lognormal" => Ok(DistributionKind::LogNormal),
            "normal" => Ok(DistributionKind::Normal),
            "uniform" => Ok(DistributionKind::Uniform),
            "triangular" => Ok(DistributionKind::Triangular),
            "weibull" => Ok(DistributionKind::Weibull),
            "gamma" => Ok(DistributionKind::Gamma),
            "beta" => Ok(DistributionKind::Beta),
            "empirical" | "discreteempirical" => Ok(DistributionKind::Empirical),
            _ => Err(unknown_kind(raw.to_string())),
        }
    }
}

fn unknown_kind(raw: String) -> KlausenError {
    KlausenError::Specification(
        ErrorInfo::new("spec-unknown-kind", "unsupported uncertainty type")
            .with_context("uncertainty_type", raw)
            .with_hint("use a stats-arrays id (0-5, 8-10) or a family name such as `normal`"),
    )
}

/// Family tag as written in a declaration: a stats-arrays id or a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UncertaintyType {
    /// Numeric stats-arrays identifier.
    Id(i64),
    /// Family name, matched case-insensitively.
    Name(String),
}

impl UncertaintyType {
    /// Resolves the tag to a supported family.
    pub fn resolve(&self) -> Result<DistributionKind, KlausenError> {
        match self {
            UncertaintyType::Id(id) => DistributionKind::from_stats_arrays_id(*id),
            UncertaintyType::Name(name) => name.parse(),
        }
    }
}

impl From<DistributionKind> for UncertaintyType {
    fn from(kind: DistributionKind) -> Self {
        UncertaintyType::Name(kind.as_str().to_string())
    }
}
