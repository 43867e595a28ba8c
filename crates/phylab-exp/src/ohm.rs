use std::any::Any;
use std::sync::OnceLock;

use phylab_core::{DataPool, PhyError, PoolValue};
use phylab_step::{DeclaredSteps, Invocation, StepDef, StepRegistry, Steppable};
use serde_json::{json, Value};

use crate::experiment::{Experiment, ExperimentKind};
use crate::transcript::Transcript;

/// Resistance from one voltage (V) and current (A) reading.
#[derive(Debug, Clone, Default)]
pub struct OhmExp {
    pool: DataPool,
    transcript: Transcript,
}

impl OhmExp {
    /// Scalar inputs.
    pub const FLOAT_KEYS: &'static [&'static str] = &["U", "I"];

    /// R = U / I.
    pub const CALC_R: StepDef<Self> = StepDef::new("calc_R", Self::calc_r);

    /// Empty experiment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Experiment over an already populated pool.
    pub fn with_pool(pool: DataPool) -> Self {
        Self {
            pool,
            transcript: Transcript::default(),
        }
    }

    /// Runs `calc_R` as a top-level invocation.
    #[allow(non_snake_case)]
    pub fn calc_R(&mut self) -> Result<Invocation, PhyError> {
        self.run_step(Self::CALC_R.name())
    }

    pub(crate) fn template() -> Value {
        json!({
            "U": 0.0,
            "I": 0.0,
            "INFO": "voltage in V, current in A",
        })
    }

    fn calc_r(&mut self) -> Result<Option<PoolValue>, PhyError> {
        let voltage = self.pool.scalar("U")?;
        let current = self.pool.scalar("I")?;
        if current == 0.0 {
            self.transcript
                .push(format!("U={voltage}V, I={current}A => R undefined (zero current)"));
            return Ok(None);
        }
        let resistance = voltage / current;
        self.transcript
            .push(format!("U={voltage}V, I={current}A => R={resistance:.2}Ω"));
        self.pool.insert("R", resistance);
        Ok(Some(PoolValue::Scalar(resistance)))
    }
}

impl DeclaredSteps for OhmExp {
    fn registry() -> &'static StepRegistry<Self> {
        static REGISTRY: OnceLock<StepRegistry<OhmExp>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = StepRegistry::new();
            registry.register(Self::CALC_R);
            registry
        })
    }
}

impl Experiment for OhmExp {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Ohm
    }

    fn pool(&self) -> &DataPool {
        &self.pool
    }

    fn pool_mut(&mut self) -> &mut DataPool {
        &mut self.pool
    }

    fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
