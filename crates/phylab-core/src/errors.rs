//! Structured error types shared across phylab crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PhyError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (keys, step names, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for phylab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PhyError {
    /// A required pool entry was never supplied or computed.
    #[error("missing key: {0}")]
    MissingKey(ErrorInfo),
    /// Resolution referenced a step name absent from the registry.
    #[error("step not found: {0}")]
    StepNotFound(ErrorInfo),
    /// The prerequisite graph loops back onto a step being resolved.
    #[error("cyclic dependency: {0}")]
    CyclicDependency(ErrorInfo),
    /// A step entry point was invoked on an instance it does not belong to.
    #[error("binding error: {0}")]
    Binding(ErrorInfo),
    /// Experiment data failed validation or has the wrong shape.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PhyError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PhyError::MissingKey(info)
            | PhyError::StepNotFound(info)
            | PhyError::CyclicDependency(info)
            | PhyError::Binding(info)
            | PhyError::Data(info)
            | PhyError::Io(info)
            | PhyError::Serde(info) => info,
        }
    }

    /// Required pool read of an absent key.
    pub fn missing_key(key: &str) -> Self {
        PhyError::MissingKey(
            ErrorInfo::new("pool.missing_key", "data not found in pool")
                .with_context("key", key)
                .with_hint("supply the value in the experiment data file"),
        )
    }

    /// Resolution of a name that was never declared.
    pub fn step_not_found(step: &str) -> Self {
        PhyError::StepNotFound(
            ErrorInfo::new("step.not_found", "step is not registered").with_context("step", step),
        )
    }

    /// Cycle in the prerequisite graph; `path` lists the loop in resolution order.
    pub fn cyclic_dependency(path: &[String]) -> Self {
        PhyError::CyclicDependency(
            ErrorInfo::new("step.cycle", "prerequisite graph contains a cycle")
                .with_context("path", path.join(" -> ")),
        )
    }

    /// Step entry point invoked on an instance of the wrong type.
    pub fn binding(step: &str, expected: &str) -> Self {
        PhyError::Binding(
            ErrorInfo::new("step.binding", "step invoked on a foreign instance")
                .with_context("step", step)
                .with_context("expected", expected),
        )
    }
}
