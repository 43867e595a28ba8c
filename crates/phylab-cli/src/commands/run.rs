use std::error::Error;

use clap::Args;
use phylab_exp::{
    data, run_experiment, to_canonical_json_bytes, ExperimentKind, LoadOutcome, OutputFormat,
};
use tracing::warn;

use crate::Settings;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Experiment name, e.g. `hysteresis`.
    pub experiment: ExperimentKind,
    /// Step to run; defaults to the experiment's final step.
    #[arg(long)]
    pub step: Option<String>,
}

pub fn run(args: &RunArgs, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut exp = args.experiment.build();
    if let LoadOutcome::Created(path) = data::load(exp.as_mut(), &settings.target_dir)? {
        warn!(path = %path.display(), "no data yet, wrote template");
        println!(
            "created {}; fill in the measurements and run again",
            path.display()
        );
        return Ok(());
    }
    let report = run_experiment(exp.as_mut(), args.step.as_deref())?;
    match settings.format {
        OutputFormat::Json => {
            let bytes = to_canonical_json_bytes(&report)?;
            println!("{}", String::from_utf8(bytes)?);
        }
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}
