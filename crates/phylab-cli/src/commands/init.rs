use std::error::Error;

use clap::Args;
use phylab_exp::{data, ExperimentKind, LoadOutcome};

use crate::Settings;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Experiment name, e.g. `pendulum`.
    pub experiment: ExperimentKind,
}

pub fn run(args: &InitArgs, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut exp = args.experiment.build();
    match data::load(exp.as_mut(), &settings.target_dir)? {
        LoadOutcome::Created(path) => println!("created {}", path.display()),
        LoadOutcome::Loaded { path, .. } => println!("exists {}", path.display()),
    }
    Ok(())
}
