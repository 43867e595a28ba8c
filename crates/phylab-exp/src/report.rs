use std::fmt;

use phylab_core::{DataPool, PhyError, PoolValue};
use phylab_step::Steppable;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::experiment::Experiment;
use crate::hash::stable_hash_string;

/// Everything the presentation layer shows after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Experiment command line name.
    pub experiment: String,
    /// Target step.
    pub step: String,
    /// SHA-256 of the canonical pool contents before the run.
    pub input_hash: String,
    /// Step bodies executed, in order.
    pub executed: Vec<String>,
    /// Value returned by the target step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PoolValue>,
    /// Lines recorded during this run.
    pub transcript: Vec<String>,
    /// Pool contents after the run.
    pub pool: DataPool,
}

/// Runs `step` (or the experiment's final step) as a top-level invocation.
///
/// The transcript is cleared first so the report only carries this run.
pub fn run_experiment(
    experiment: &mut dyn Experiment,
    step: Option<&str>,
) -> Result<RunReport, PhyError> {
    let kind = experiment.kind();
    let input_hash = stable_hash_string(experiment.pool())?;
    experiment.transcript_mut().clear();
    let invocation = match step {
        Some(name) => experiment.run_step(name)?,
        None => kind.final_step().invoke(experiment.as_any_mut())?,
    };
    info!(
        experiment = kind.name(),
        step = invocation.step.as_str(),
        executed = invocation.executed.len(),
        "run finished"
    );
    Ok(RunReport {
        experiment: kind.name().to_string(),
        step: invocation.step,
        input_hash,
        executed: invocation.executed,
        output: invocation.output,
        transcript: experiment.transcript_mut().take(),
        pool: experiment.pool().clone(),
    })
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "experiment: {}", self.experiment)?;
        writeln!(f, "step: {} (ran {})", self.step, self.executed.join(" -> "))?;
        writeln!(f, "input hash: {}", self.input_hash)?;
        if !self.transcript.is_empty() {
            writeln!(f)?;
            for line in &self.transcript {
                writeln!(f, "{line}")?;
            }
        }
        if let Some(output) = &self.output {
            writeln!(f)?;
            writeln!(f, "output: {}", render_value(output))?;
        }
        writeln!(f)?;
        writeln!(f, "pool:")?;
        for (key, value) in self.pool.iter() {
            writeln!(f, "  {key} = {}", render_value(value))?;
        }
        Ok(())
    }
}

fn render_value(value: &PoolValue) -> String {
    match value {
        PoolValue::Scalar(scalar) => format!("{scalar}"),
        PoolValue::Series(series) => {
            let items: Vec<String> = series.iter().map(|item| format!("{item}")).collect();
            format!("[{}]", items.join(", "))
        }
    }
}
