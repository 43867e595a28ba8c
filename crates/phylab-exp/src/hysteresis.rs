use std::any::Any;
use std::sync::OnceLock;

use phylab_core::{DataPool, PhyError, PoolValue};
use phylab_step::{DeclaredSteps, Invocation, StepDef, StepRegistry, Steppable};
use serde_json::{json, Value};

use crate::experiment::{Experiment, ExperimentKind};
use crate::transcript::Transcript;

/// Field strength H, flux density B and permeability μ from oscilloscope
/// deflections of a hysteresis loop.
#[derive(Debug, Clone, Default)]
pub struct HysteresisExp {
    pool: DataPool,
    transcript: Transcript,
}

/// Apparatus constants read from the pool.
struct Apparatus {
    n1: f64,
    n2: f64,
    length: f64,
    area: f64,
    sx: f64,
    sy: f64,
    r1: f64,
    r2: f64,
    capacitance: f64,
}

impl Apparatus {
    fn from_pool(pool: &DataPool) -> Result<Self, PhyError> {
        Ok(Self {
            n1: pool.scalar("N1")?,
            n2: pool.scalar("N2")?,
            length: pool.scalar("l")?,
            area: pool.scalar("S")?,
            sx: pool.scalar("Sx")?,
            sy: pool.scalar("Sy")?,
            r1: pool.scalar("R1")?,
            r2: pool.scalar("R2")?,
            capacitance: pool.scalar("C_uf")? * 1e-6,
        })
    }

    fn field(&self, x: f64) -> f64 {
        (self.n1 * x * self.sx) / (self.length * self.r1)
    }

    fn flux_density(&self, y: f64) -> f64 {
        (self.r2 * self.capacitance * y * self.sy) / (self.n2 * self.area)
    }
}

impl HysteresisExp {
    /// Scalar inputs.
    pub const FLOAT_KEYS: &'static [&'static str] =
        &["N1", "N2", "l", "S", "Sx", "Sy", "R1", "R2", "C_uf"];
    /// List inputs: horizontal and vertical deflections.
    pub const LIST_KEYS: &'static [&'static str] = &["X_list", "Y_list"];

    /// Per-point H, B and μ.
    pub const CALCULATE_BH: StepDef<Self> = StepDef::new("calculate_BH", Self::calculate_bh);

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

    /// Runs `calculate_BH` as a top-level invocation.
    #[allow(non_snake_case)]
    pub fn calculate_BH(&mut self) -> Result<Invocation, PhyError> {
        self.run_step(Self::CALCULATE_BH.name())
    }

    pub(crate) fn template() -> Value {
        json!({
            "N1": 100, "N2": 300, "l": 0.084, "S": 2.21e-4,
            "Sx": 0.2, "Sy": 0.2, "R1": 1.9, "R2": 1.1e3, "C_uf": 2.0,
            "X_list": ["0.5", "1.0", "1.5"],
            "Y_list": ["0.8", "1.6", "2.4"],
            "INFO": "default apparatus parameters",
        })
    }

    fn calculate_bh(&mut self) -> Result<Option<PoolValue>, PhyError> {
        let apparatus = Apparatus::from_pool(&self.pool)?;
        let xs = self.pool.series("X_list")?.to_vec();
        let ys = self.pool.series("Y_list")?.to_vec();
        if xs.is_empty() || ys.is_empty() {
            for key in ["Results_H", "Results_B", "Results_mu"] {
                self.pool.insert(key, Vec::<f64>::new());
            }
            return Ok(None);
        }

        self.transcript.push(format!(
            "{:<4} | {:<12} | {:<12} | {:<12}",
            "No.", "H (A/m)", "B (T)", "μ (H/m)"
        ));
        self.transcript.push("-".repeat(50));

        let mut fields = Vec::with_capacity(xs.len());
        let mut densities = Vec::with_capacity(xs.len());
        let mut permeabilities = Vec::with_capacity(xs.len());
        for (idx, (x, y)) in xs.iter().zip(&ys).enumerate() {
            let h = apparatus.field(*x);
            let b = apparatus.flux_density(*y);
            let mu = if h != 0.0 { b / h } else { 0.0 };
            self.transcript.push(format!(
                "{:<4} | {h:<12.4} | {b:<12.6} | {mu:<12.6}",
                idx + 1
            ));
            fields.push(h);
            densities.push(b);
            permeabilities.push(mu);
        }

        self.pool.insert("Results_H", fields);
        self.pool.insert("Results_B", densities);
        self.pool.insert("Results_mu", permeabilities);
        Ok(None)
    }
}

impl DeclaredSteps for HysteresisExp {
    fn registry() -> &'static StepRegistry<Self> {
        static REGISTRY: OnceLock<StepRegistry<HysteresisExp>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = StepRegistry::new();
            registry.register(Self::CALCULATE_BH);
            registry
        })
    }
}

impl Experiment for HysteresisExp {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Hysteresis
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
