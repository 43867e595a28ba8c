use std::any::Any;
use std::f64::consts::PI;
use std::sync::OnceLock;

use phylab_core::{DataPool, PhyError, PoolValue};
use phylab_step::{DeclaredSteps, Invocation, StepDef, StepRegistry, Steppable};
use serde_json::{json, Value};

use crate::experiment::{Experiment, ExperimentKind};
use crate::transcript::Transcript;

/// Gravitational acceleration from pendulum lengths (m) and periods (s).
#[derive(Debug, Clone, Default)]
pub struct PendulumExp {
    pool: DataPool,
    transcript: Transcript,
}

impl PendulumExp {
    /// List inputs.
    pub const LIST_KEYS: &'static [&'static str] = &["L_list", "T_list"];

    /// g = 4π²L/T² for every (L, T) pair.
    pub const CALCULATE_G: StepDef<Self> = StepDef::new("step1_calculate_g", Self::calculate_g);
    /// Mean of the per-pair results.
    pub const AVERAGE: StepDef<Self> = StepDef::new("step2_average", Self::average);

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

    /// Runs `step1_calculate_g` as a top-level invocation.
    pub fn step1_calculate_g(&mut self) -> Result<Invocation, PhyError> {
        self.run_step(Self::CALCULATE_G.name())
    }

    /// Runs `step2_average` (and its prerequisites) as a top-level invocation.
    pub fn step2_average(&mut self) -> Result<Invocation, PhyError> {
        self.run_step(Self::AVERAGE.name())
    }

    pub(crate) fn template() -> Value {
        json!({
            "L_list": [],
            "T_list": [],
            "INFO": "pendulum lengths in m, periods in s",
        })
    }

    fn calculate_g(&mut self) -> Result<Option<PoolValue>, PhyError> {
        let lengths = self.pool.series("L_list")?.to_vec();
        let periods = self.pool.series("T_list")?.to_vec();
        if lengths.is_empty() || periods.is_empty() {
            self.pool.insert("g_results", Vec::<f64>::new());
            return Ok(None);
        }

        self.transcript
            .push(format!("--- pendulum ({} samples) ---", lengths.len()));
        let mut results = Vec::with_capacity(lengths.len());
        for (idx, (length, period)) in lengths.iter().zip(&periods).enumerate() {
            if *period == 0.0 {
                continue;
            }
            let g = 4.0 * PI * PI * length / (period * period);
            results.push(g);
            self.transcript.push(format!(
                "sample {}: L={length}m, T={period}s => g = {g:.4}",
                idx + 1
            ));
        }
        self.pool.insert("g_results", results);
        Ok(None)
    }

    fn average(&mut self) -> Result<Option<PoolValue>, PhyError> {
        let results = self.pool.series("g_results")?;
        if results.is_empty() {
            self.pool.remove("g_average");
            return Ok(None);
        }
        let mean = results.iter().sum::<f64>() / results.len() as f64;
        self.transcript
            .push(format!("final result: g = {mean:.4} m/s^2"));
        self.pool.insert("g_average", mean);
        Ok(Some(PoolValue::Scalar(mean)))
    }
}

impl DeclaredSteps for PendulumExp {
    fn registry() -> &'static StepRegistry<Self> {
        static REGISTRY: OnceLock<StepRegistry<PendulumExp>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = StepRegistry::new();
            registry.depends(Self::AVERAGE, &[Self::CALCULATE_G]);
            registry
        })
    }
}

impl Experiment for PendulumExp {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Pendulum
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
