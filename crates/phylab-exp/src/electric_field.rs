use std::any::Any;
use std::sync::OnceLock;

use phylab_core::{DataPool, PhyError, PoolValue};
use phylab_step::{DeclaredSteps, Invocation, StepDef, StepRegistry, Steppable};
use serde_json::{Map, Value};

use crate::experiment::{Experiment, ExperimentKind};
use crate::transcript::Transcript;

/// Measured equipotential radii compared with their theoretical values.
#[derive(Debug, Clone, Default)]
pub struct ElectricFieldExp {
    pool: DataPool,
    transcript: Transcript,
}

/// (input key, potential in V, theoretical radius in cm).
const SETTINGS: [(&str, f64, f64); 5] = [
    ("r(cm)7.5V", 7.5, 1.38),
    ("r(cm)6.0V", 6.0, 1.91),
    ("r(cm)4.5V", 4.5, 2.63),
    ("r(cm)3.0V", 3.0, 3.63),
    ("r(cm)1.5V", 1.5, 5.05),
];

impl ElectricFieldExp {
    /// List inputs, one per equipotential.
    pub const LIST_KEYS: &'static [&'static str] = &[
        SETTINGS[0].0,
        SETTINGS[1].0,
        SETTINGS[2].0,
        SETTINGS[3].0,
        SETTINGS[4].0,
    ];

    /// Mean radius and relative error per equipotential.
    pub const CALCULATE_RESULTS: StepDef<Self> =
        StepDef::new("calculate_results", Self::compute_results);

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

    /// Runs `calculate_results` as a top-level invocation.
    pub fn calculate_results(&mut self) -> Result<Invocation, PhyError> {
        self.run_step(Self::CALCULATE_RESULTS.name())
    }

    pub(crate) fn template() -> Value {
        let mut record: Map<String, Value> = SETTINGS
            .iter()
            .map(|(key, _, _)| (key.to_string(), Value::from(vec![0.0; 4])))
            .collect();
        record.insert(
            "INFO".to_string(),
            Value::from("electrostatic field radii in cm"),
        );
        Value::Object(record)
    }

    fn compute_results(&mut self) -> Result<Option<PoolValue>, PhyError> {
        self.transcript.push(format!(
            "{:<10} | {:<10} | {:<10} | {:<10}",
            "potential", "mean", "theory", "error (%)"
        ));
        self.transcript.push("-".repeat(60));

        let mut potentials = Vec::new();
        let mut means = Vec::new();
        let mut theories = Vec::new();
        let mut errors = Vec::new();
        for (key, potential, theory) in SETTINGS {
            let samples = self.pool.series(key)?;
            if samples.is_empty() {
                continue;
            }
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            let error = if theory != 0.0 {
                (mean - theory).abs() / theory * 100.0
            } else {
                0.0
            };
            let label = key.trim_start_matches("r(cm)");
            self.transcript.push(format!(
                "{label:<10} | {mean:<10.4} | {theory:<10.4} | {error:<10.2}%"
            ));
            potentials.push(potential);
            means.push(mean);
            theories.push(theory);
            errors.push(error);
        }

        self.pool.insert("Results_voltage", potentials);
        self.pool.insert("Results_mean", means);
        self.pool.insert("Results_theory", theories);
        self.pool.insert("Results_error", errors);
        Ok(None)
    }
}

impl DeclaredSteps for ElectricFieldExp {
    fn registry() -> &'static StepRegistry<Self> {
        static REGISTRY: OnceLock<StepRegistry<ElectricFieldExp>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = StepRegistry::new();
            registry.register(Self::CALCULATE_RESULTS);
            registry
        })
    }
}

impl Experiment for ElectricFieldExp {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::ElectricField
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
