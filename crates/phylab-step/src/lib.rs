//! Named computation steps with declared prerequisites, executed at most once
//! per top-level invocation and always in dependency order.
//!
//! ```
//! use phylab_core::{DataPool, PhyError, PoolValue};
//! use phylab_step::{StepDef, StepRegistry};
//!
//! struct Lab {
//!     pool: DataPool,
//! }
//!
//! fn load(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
//!     lab.pool.insert("x", 2.0);
//!     Ok(None)
//! }
//!
//! fn square(lab: &mut Lab) -> Result<Option<PoolValue>, PhyError> {
//!     let x = lab.pool.scalar("x")?;
//!     Ok(Some(PoolValue::Scalar(x * x)))
//! }
//!
//! let mut registry = StepRegistry::new();
//! registry.depends(StepDef::new("square", square), &[StepDef::new("load", load)]);
//!
//! let mut lab = Lab { pool: DataPool::new() };
//! let invocation = registry.run(&mut lab, "square")?;
//! assert_eq!(invocation.executed, ["load", "square"]);
//! assert_eq!(invocation.output, Some(PoolValue::Scalar(4.0)));
//! # Ok::<(), PhyError>(())
//! ```

mod context;
mod registry;
mod step;
mod steppable;

pub use context::{ExecutionContext, Invocation, RunState};
pub use registry::StepRegistry;
pub use step::{StepDef, StepFn};
pub use steppable::{DeclaredSteps, StepHandle, Steppable};
