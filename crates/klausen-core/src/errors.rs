//! Error families of the sampling engine.
//!
//! Every failure carries an [`ErrorInfo`]: a stable kebab-case `code` that
//! callers can match on, a message, and key/value context such as the
//! offending parameter name.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload shared by all [`KlausenError`] families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable identifier, e.g. `spec-missing-field`.
    pub code: String,
    /// Description for humans.
    pub message: String,
    /// Where the error happened: parameter, field, bounds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    /// Suggested fix, when there is an obvious one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key=value`; a later value for the same key wins.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        let mut pairs = self.context.iter();
        if let Some((key, value)) = pairs.next() {
            write!(f, " [{key}={value}")?;
            for (key, value) in pairs {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("]")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Every failure the engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum KlausenError {
    /// Invalid declaration or call argument; no engine state was changed.
    #[error("specification error: {0}")]
    Specification(ErrorInfo),
    /// Values were read before the first transition.
    #[error("not ready: {0}")]
    NotReady(ErrorInfo),
    /// The name was never declared.
    #[error("unknown parameter: {0}")]
    UnknownParameter(ErrorInfo),
    /// A draw could not be completed.
    #[error("draw error: {0}")]
    Draw(ErrorInfo),
    /// Declaration or configuration files could not be read or parsed.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl KlausenError {
    /// [`KlausenError::Specification`] with a bare payload.
    pub fn specification(code: impl Into<String>, message: impl Into<String>) -> Self {
        KlausenError::Specification(ErrorInfo::new(code, message))
    }

    /// Payload of any family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            KlausenError::Specification(info)
            | KlausenError::NotReady(info)
            | KlausenError::UnknownParameter(info)
            | KlausenError::Draw(info)
            | KlausenError::Config(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            KlausenError::Specification(info)
            | KlausenError::NotReady(info)
            | KlausenError::UnknownParameter(info)
            | KlausenError::Draw(info)
            | KlausenError::Config(info) => info,
        }
    }

    /// Adds context without changing the family.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }
}
