use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use klausen_core::{ErrorInfo, KlausenError};
use klausen_dist::{DrawOptions, RawSpec};
use serde::{Deserialize, Serialize};

/// Parameter declarations keyed by name, in file order.
pub type Declaration = IndexMap<String, RawSpec>;

/// YAML-configurable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trial count used by `Engine::stochastic_default`.
    #[serde(default = "default_iterations")]
    pub default_iterations: usize,
    /// Where unseeded stochastic draws take their seed from.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Rejection sampling budget for truncated families.
    #[serde(default)]
    pub truncation: TruncationConfig,
}

fn default_iterations() -> usize {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_iterations: default_iterations(),
            seed_policy: SeedPolicy::default(),
            truncation: TruncationConfig::default(),
        }
    }
}

/// Seeding policy for stochastic calls made without an explicit seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Session seed. When set, the k-th unseeded draw uses the SipHash
    /// substream `(master_seed, k)`; when unset, OS entropy is used.
    #[serde(default)]
    pub master_seed: Option<u64>,
}

/// Truncated-distribution sampling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationConfig {
    /// Rejection attempts per drawn value before a draw error.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DrawOptions::DEFAULT_MAX_ATTEMPTS
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl TruncationConfig {
    pub(crate) fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            max_attempts: self.max_attempts,
        }
    }
}

fn read(path: &Path) -> Result<String, KlausenError> {
    fs::read_to_string(path).map_err(|err| {
        KlausenError::Config(
            ErrorInfo::new("config-read", "failed to read file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

fn parse_error(code: &str, err: impl ToString) -> KlausenError {
    KlausenError::Config(ErrorInfo::new(code, err.to_string()))
}

/// Parses a declaration mapping from YAML.
pub fn declaration_from_yaml_str(yaml: &str) -> Result<Declaration, KlausenError> {
    serde_yaml::from_str(yaml).map_err(|err| parse_error("config-yaml-parse", err))
}

/// Parses a declaration mapping from JSON.
pub fn declaration_from_json_str(json: &str) -> Result<Declaration, KlausenError> {
    serde_json::from_str(json).map_err(|err| parse_error("config-json-parse", err))
}

/// Loads a declaration file; `.json` is parsed as JSON, anything else as YAML.
pub fn load_declaration(path: impl AsRef<Path>) -> Result<Declaration, KlausenError> {
    let path = path.as_ref();
    let text = read(path)?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => declaration_from_json_str(&text),
        _ => declaration_from_yaml_str(&text),
    };
    parsed.map_err(|err| err.with_context("path", path.display().to_string()))
}

/// Loads an [`EngineConfig`] from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, KlausenError> {
    let path = path.as_ref();
    let text = read(path)?;
    serde_yaml::from_str(&text).map_err(|err| {
        parse_error("config-yaml-parse", err).with_context("path", path.display().to_string())
    })
}
