use std::collections::BTreeMap;

use phylab_core::{PhyError, PoolValue};
use tracing::{debug, warn};

use crate::context::{ExecutionContext, Invocation, RunState};
use crate::step::{Step, StepDef};

/// Registry of named steps with declared prerequisites for instances of `E`.
///
/// The registry is immutable once built and holds no run state, so a single
/// registry per experiment type can live in a `OnceLock` static.
pub struct StepRegistry<E> {
    steps: BTreeMap<String, Step<E>>,
}

impl<E> Default for StepRegistry<E> {
    fn default() -> Self {
        Self {
            steps: BTreeMap::new(),
        }
    }
}

impl<E> std::fmt::Debug for StepRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph: BTreeMap<&str, &[String]> = self
            .steps
            .iter()
            .map(|(name, step)| (name.as_str(), step.prerequisites.as_slice()))
            .collect();
        f.debug_struct("StepRegistry").field("steps", &graph).finish()
    }
}

impl<E> StepRegistry<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `step` without prerequisites.
    pub fn register(&mut self, step: StepDef<E>) -> &mut Self {
        self.depends(step, &[])
    }

    /// Declares `step` with an ordered list of prerequisites.
    ///
    /// The first registration of a name fixes its body. Every prerequisite is
    /// registered too, and appended to the step's prerequisite list unless it
    /// is already listed there.
    pub fn depends(&mut self, step: StepDef<E>, prerequisites: &[StepDef<E>]) -> &mut Self {
        self.steps
            .entry(step.name().to_string())
            .or_insert_with(|| Step::new(step.body()));
        for prerequisite in prerequisites {
            self.register(*prerequisite);
        }
        if let Some(entry) = self.steps.get_mut(step.name()) {
            for prerequisite in prerequisites {
                if !entry
                    .prerequisites
                    .iter()
                    .any(|name| name == prerequisite.name())
                {
                    entry.prerequisites.push(prerequisite.name().to_string());
                }
            }
        }
        self
    }

    /// Returns whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Registered step names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.keys().map(String::as_str).collect()
    }

    /// Declared prerequisites of `name`, in declaration order.
    pub fn prerequisites(&self, name: &str) -> Result<&[String], PhyError> {
        self.steps
            .get(name)
            .map(|step| step.prerequisites.as_slice())
            .ok_or_else(|| PhyError::step_not_found(name))
    }

    /// Runs `name` on `instance` as a fresh top-level invocation.
    pub fn run(&self, instance: &mut E, name: &str) -> Result<Invocation, PhyError> {
        let mut ctx = ExecutionContext::new();
        self.run_in(instance, name, &mut ctx)
    }

    /// Runs `name` as a top-level invocation tracked by `ctx`.
    ///
    /// `ctx` is reset first. On failure it keeps the steps completed before
    /// the error and ends in [`RunState::Failed`].
    pub fn run_in(
        &self,
        instance: &mut E,
        name: &str,
        ctx: &mut ExecutionContext,
    ) -> Result<Invocation, PhyError> {
        ctx.reset();
        ctx.set_state(RunState::ResolvingPrerequisites);
        match self.resolve(instance, name, ctx, false) {
            Ok(output) => {
                ctx.set_state(RunState::Done);
                Ok(Invocation {
                    step: name.to_string(),
                    output,
                    executed: ctx.executed().to_vec(),
                })
            }
            Err(err) => {
                warn!(step = name, error = %err, "invocation failed");
                ctx.set_state(RunState::Failed);
                Err(err)
            }
        }
    }

    fn resolve(
        &self,
        instance: &mut E,
        name: &str,
        ctx: &mut ExecutionContext,
        nested: bool,
    ) -> Result<Option<PoolValue>, PhyError> {
        if nested && ctx.is_executed(name) {
            debug!(step = name, "already executed in this invocation");
            return Ok(None);
        }
        let step = self
            .steps
            .get(name)
            .ok_or_else(|| PhyError::step_not_found(name))?;
        ctx.enter(name)
            .map_err(|path| PhyError::cyclic_dependency(&path))?;
        for prerequisite in &step.prerequisites {
            if let Err(err) = self.resolve(instance, prerequisite, ctx, true) {
                ctx.leave();
                return Err(err);
            }
        }
        ctx.leave();
        ctx.mark_executed(name);
        if !nested {
            ctx.set_state(RunState::Running(name.to_string()));
        }
        debug!(step = name, nested, "running step");
        (step.body)(instance)
    }
}
