use std::collections::BTreeSet;

use phylab_core::PoolValue;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single top-level invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "step", rename_all = "kebab-case")]
pub enum RunState {
    /// No invocation started yet.
    #[default]
    Idle,
    /// Prerequisites of the target are being resolved and run.
    ResolvingPrerequisites,
    /// The target body itself is running.
    Running(String),
    /// The target body returned successfully.
    Done,
    /// A prerequisite or the target failed; the error went to the caller.
    Failed,
}

/// Tracking state for one top-level invocation.
///
/// A fresh context is constructed (or an existing one reset) at the start of
/// every top-level call and threaded through the recursive resolution, so
/// memoization never leaks from one invocation into the next.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    executed: BTreeSet<String>,
    order: Vec<String>,
    resolving: Vec<String>,
    state: RunState,
}

impl ExecutionContext {
    /// Creates an idle context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `step` completed during the current invocation.
    pub fn is_executed(&self, step: &str) -> bool {
        self.executed.contains(step)
    }

    /// Steps marked executed so far, in execution order.
    pub fn executed(&self) -> &[String] {
        &self.order
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub(crate) fn reset(&mut self) {
        self.executed.clear();
        self.order.clear();
        self.resolving.clear();
        self.state = RunState::Idle;
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub(crate) fn mark_executed(&mut self, step: &str) {
        if self.executed.insert(step.to_string()) {
            self.order.push(step.to_string());
        }
    }

    /// Pushes `step` onto the resolution stack. On a cycle returns the loop,
    /// starting and ending with the repeated step.
    pub(crate) fn enter(&mut self, step: &str) -> Result<(), Vec<String>> {
        if let Some(start) = self.resolving.iter().position(|name| name == step) {
            let mut path = self.resolving[start..].to_vec();
            path.push(step.to_string());
            return Err(path);
        }
        self.resolving.push(step.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.resolving.pop();
    }
}

/// Outcome of a successful top-level invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Target step name.
    pub step: String,
    /// Value returned by the target body, if any.
    pub output: Option<PoolValue>,
    /// Every step body executed, in execution order (target last).
    pub executed: Vec<String>,
}
