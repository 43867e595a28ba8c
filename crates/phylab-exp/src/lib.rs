//! Experiment catalog, data loading and run reports for phylab.

mod config;
pub mod data;
mod electric_field;
mod experiment;
mod hash;
mod hysteresis;
mod ohm;
mod pendulum;
mod report;
mod serde;
mod transcript;

pub use config::{LabConfig, OutputFormat, DEFAULT_CONFIG_FILE};
pub use data::{load, parse_series, save, LoadOutcome};
pub use electric_field::ElectricFieldExp;
pub use experiment::{Experiment, ExperimentKind};
pub use hash::stable_hash_string;
pub use hysteresis::HysteresisExp;
pub use ohm::OhmExp;
pub use pendulum::PendulumExp;
pub use report::{run_experiment, RunReport};
pub use transcript::Transcript;

pub use serde::{from_json_slice, to_canonical_json_bytes};
