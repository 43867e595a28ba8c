use std::any::{type_name, Any};

use phylab_core::PhyError;

use crate::context::Invocation;
use crate::registry::StepRegistry;

/// Capability of an object whose declared steps can be invoked by name.
///
/// Every call to [`Steppable::run_step`] is a fresh top-level invocation.
pub trait Steppable {
    /// Runs `name` and all of its prerequisites.
    fn run_step(&mut self, name: &str) -> Result<Invocation, PhyError>;

    /// Names of the steps this object declares.
    fn step_names(&self) -> Vec<&'static str>;
}

/// Types that own a static [`StepRegistry`] over themselves.
pub trait DeclaredSteps: Sized + 'static {
    /// Registry shared by every instance of the type.
    fn registry() -> &'static StepRegistry<Self>;
}

impl<T: DeclaredSteps> Steppable for T {
    fn run_step(&mut self, name: &str) -> Result<Invocation, PhyError> {
        T::registry().run(self, name)
    }

    fn step_names(&self) -> Vec<&'static str> {
        T::registry().names()
    }
}

/// Type-erased entry point for one declared step.
///
/// The handle remembers which type declared the step; invoking it on
/// anything else fails with [`PhyError::Binding`].
#[derive(Clone, Copy)]
pub struct StepHandle {
    step: &'static str,
    owner: &'static str,
    invoke: fn(&mut dyn Any, &'static str, &'static str) -> Result<Invocation, PhyError>,
}

impl StepHandle {
    /// Handle for `step` declared by `T`.
    pub fn of<T: Steppable + 'static>(step: &'static str) -> Self {
        Self {
            step,
            owner: type_name::<T>(),
            invoke: invoke_as::<T>,
        }
    }

    /// Step name.
    pub fn step(&self) -> &'static str {
        self.step
    }

    /// Fully qualified name of the declaring type.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Runs the step as a top-level invocation on `target`.
    pub fn invoke(&self, target: &mut dyn Any) -> Result<Invocation, PhyError> {
        (self.invoke)(target, self.step, self.owner)
    }
}

impl std::fmt::Debug for StepHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepHandle")
            .field("step", &self.step)
            .field("owner", &self.owner)
            .finish()
    }
}

fn invoke_as<T: Steppable + 'static>(
    target: &mut dyn Any,
    step: &'static str,
    owner: &'static str,
) -> Result<Invocation, PhyError> {
    let instance = target
        .downcast_mut::<T>()
        .ok_or_else(|| PhyError::binding(step, owner))?;
    instance.run_step(step)
}
