use std::collections::BTreeMap;
use std::error::Error;

use clap::Args;
use phylab_core::{ErrorInfo, PhyError, PoolValue};
use phylab_exp::{data, parse_series, ExperimentKind};

use crate::Settings;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Experiment name, e.g. `ohm`.
    pub experiment: ExperimentKind,
    /// Assignments such as `U=4.5` or `L_list=1.0,1.2,1.4`.
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub values: Vec<String>,
}

pub fn run(args: &SetArgs, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let kind = args.experiment;
    let mut values = BTreeMap::new();
    for assignment in &args.values {
        let (key, raw) = parse_assignment(kind, assignment)?;
        values.insert(key, raw);
    }
    let path = data::save(&settings.target_dir, kind, &values)?;
    println!("updated {} ({} values)", path.display(), values.len());
    Ok(())
}

fn parse_assignment(
    kind: ExperimentKind,
    assignment: &str,
) -> Result<(String, PoolValue), PhyError> {
    let (key, raw) = assignment.split_once('=').ok_or_else(|| {
        PhyError::Data(
            ErrorInfo::new("cli.assignment", "expected KEY=VALUE")
                .with_context("argument", assignment),
        )
    })?;
    let key = key.trim();
    let value = if kind.list_keys().iter().any(|name| *name == key) {
        PoolValue::Series(parse_series(raw)?)
    } else if kind.float_keys().iter().any(|name| *name == key) {
        match parse_series(raw)?.as_slice() {
            [single] => PoolValue::Scalar(*single),
            _ => {
                return Err(PhyError::Data(
                    ErrorInfo::new("cli.scalar", "expected a single number")
                        .with_context("key", key),
                ))
            }
        }
    } else {
        return Err(PhyError::Data(
            ErrorInfo::new("cli.unknown_key", "key is not an input of this experiment")
                .with_context("key", key)
                .with_context("experiment", kind.name()),
        ));
    };
    Ok((key.to_string(), value))
}
