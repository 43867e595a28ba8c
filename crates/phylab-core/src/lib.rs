#![deny(missing_docs)]
#![doc = "Core error model and data pool shared by the phylab crates."]

pub mod errors;
pub mod pool;

pub use errors::{ErrorInfo, PhyError};
pub use pool::{DataPool, PoolValue};
