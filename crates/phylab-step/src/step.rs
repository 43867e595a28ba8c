use phylab_core::{PhyError, PoolValue};

/// Computation body of a step, bound to the owning instance type `E`.
///
/// Void-style steps return `Ok(None)`.
pub type StepFn<E> = fn(&mut E) -> Result<Option<PoolValue>, PhyError>;

/// Declaration handle pairing a step name with its body.
pub struct StepDef<E> {
    name: &'static str,
    body: StepFn<E>,
}

impl<E> StepDef<E> {
    /// Creates a declaration; usable in `const` items.
    pub const fn new(name: &'static str, body: StepFn<E>) -> Self {
        Self { name, body }
    }

    /// Step name, unique within a registry.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn body(&self) -> StepFn<E> {
        self.body
    }
}

impl<E> Clone for StepDef<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for StepDef<E> {}

impl<E> std::fmt::Debug for StepDef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Registered step: body plus ordered prerequisite names.
pub(crate) struct Step<E> {
    pub(crate) body: StepFn<E>,
    pub(crate) prerequisites: Vec<String>,
}

impl<E> Step<E> {
    pub(crate) fn new(body: StepFn<E>) -> Self {
        Self {
            body,
            prerequisites: Vec::new(),
        }
    }
}
