use std::any::Any;
use std::fmt;
use std::str::FromStr;

use phylab_core::{DataPool, ErrorInfo, PhyError};
use phylab_step::{StepHandle, Steppable};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::electric_field::ElectricFieldExp;
use crate::hysteresis::HysteresisExp;
use crate::ohm::OhmExp;
use crate::pendulum::PendulumExp;
use crate::transcript::Transcript;

/// An experiment instance: a data pool, a transcript and declared steps.
pub trait Experiment: Steppable + Any {
    /// Catalog entry describing this experiment.
    fn kind(&self) -> ExperimentKind;

    /// Inputs and results.
    fn pool(&self) -> &DataPool;

    /// Mutable access for loaders and the presentation layer.
    fn pool_mut(&mut self) -> &mut DataPool;

    /// Lines recorded by step bodies.
    fn transcript(&self) -> &Transcript;

    /// Mutable transcript access.
    fn transcript_mut(&mut self) -> &mut Transcript;

    /// Upcast used by [`StepHandle::invoke`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The experiments shipped with phylab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentKind {
    /// Gravitational acceleration from a simple pendulum.
    Pendulum,
    /// Resistance by the voltmeter-ammeter method.
    Ohm,
    /// B-H curve of a ferromagnetic sample.
    Hysteresis,
    /// Equipotential radii of an electrostatic field.
    ElectricField,
}

impl ExperimentKind {
    /// Every experiment in menu order.
    pub const ALL: [ExperimentKind; 4] = [
        ExperimentKind::Pendulum,
        ExperimentKind::Ohm,
        ExperimentKind::Hysteresis,
        ExperimentKind::ElectricField,
    ];

    /// Command line name.
    pub fn name(self) -> &'static str {
        match self {
            ExperimentKind::Pendulum => "pendulum",
            ExperimentKind::Ohm => "ohm",
            ExperimentKind::Hysteresis => "hysteresis",
            ExperimentKind::ElectricField => "electric-field",
        }
    }

    /// Human readable title.
    pub fn title(self) -> &'static str {
        match self {
            ExperimentKind::Pendulum => "Simple pendulum: gravitational acceleration",
            ExperimentKind::Ohm => "Voltmeter-ammeter method: resistance",
            ExperimentKind::Hysteresis => "Hysteresis loop: H-B calculation",
            ExperimentKind::ElectricField => "Electrostatic field: mean radius and error",
        }
    }

    /// Stem of the data file, also the experiment type name.
    pub fn data_name(self) -> &'static str {
        match self {
            ExperimentKind::Pendulum => "PendulumExp",
            ExperimentKind::Ohm => "OhmExp",
            ExperimentKind::Hysteresis => "HysteresisExp",
            ExperimentKind::ElectricField => "ElectricFieldExp",
        }
    }

    /// Keys holding a single number.
    pub fn float_keys(self) -> &'static [&'static str] {
        match self {
            ExperimentKind::Pendulum => &[],
            ExperimentKind::Ohm => OhmExp::FLOAT_KEYS,
            ExperimentKind::Hysteresis => HysteresisExp::FLOAT_KEYS,
            ExperimentKind::ElectricField => &[],
        }
    }

    /// Keys holding a list of numbers.
    pub fn list_keys(self) -> &'static [&'static str] {
        match self {
            ExperimentKind::Pendulum => PendulumExp::LIST_KEYS,
            ExperimentKind::Ohm => &[],
            ExperimentKind::Hysteresis => HysteresisExp::LIST_KEYS,
            ExperimentKind::ElectricField => ElectricFieldExp::LIST_KEYS,
        }
    }

    /// Entry point of the step the presentation layer runs by default.
    pub fn final_step(self) -> StepHandle {
        match self {
            ExperimentKind::Pendulum => {
                StepHandle::of::<PendulumExp>(PendulumExp::AVERAGE.name())
            }
            ExperimentKind::Ohm => StepHandle::of::<OhmExp>(OhmExp::CALC_R.name()),
            ExperimentKind::Hysteresis => {
                StepHandle::of::<HysteresisExp>(HysteresisExp::CALCULATE_BH.name())
            }
            ExperimentKind::ElectricField => {
                StepHandle::of::<ElectricFieldExp>(ElectricFieldExp::CALCULATE_RESULTS.name())
            }
        }
    }

    /// Data record written when no data file exists yet.
    pub fn template(self) -> Value {
        match self {
            ExperimentKind::Pendulum => PendulumExp::template(),
            ExperimentKind::Ohm => OhmExp::template(),
            ExperimentKind::Hysteresis => HysteresisExp::template(),
            ExperimentKind::ElectricField => ElectricFieldExp::template(),
        }
    }

    /// Constructs an empty instance.
    pub fn build(self) -> Box<dyn Experiment> {
        match self {
            ExperimentKind::Pendulum => Box::new(PendulumExp::new()),
            ExperimentKind::Ohm => Box::new(OhmExp::new()),
            ExperimentKind::Hysteresis => Box::new(HysteresisExp::new()),
            ExperimentKind::ElectricField => Box::new(ElectricFieldExp::new()),
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExperimentKind {
    type Err = PhyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ExperimentKind::ALL
            .into_iter()
            .find(|kind| kind.name() == value || kind.data_name() == value)
            .ok_or_else(|| {
                let known: Vec<&str> = ExperimentKind::ALL.iter().map(|kind| kind.name()).collect();
                PhyError::Data(
                    ErrorInfo::new("experiment.unknown", "unknown experiment")
                        .with_context("name", value)
                        .with_hint(format!("expected one of: {}", known.join(", "))),
                )
            })
    }
}
