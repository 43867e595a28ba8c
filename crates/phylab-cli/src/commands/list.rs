use std::error::Error;

use phylab_exp::{ExperimentKind, OutputFormat};
use phylab_step::Steppable;
use serde_json::{json, Value};

use crate::Settings;

pub fn run(settings: &Settings) -> Result<(), Box<dyn Error>> {
    match settings.format {
        OutputFormat::Json => {
            let entries: Vec<Value> = ExperimentKind::ALL.into_iter().map(describe).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for kind in ExperimentKind::ALL {
                let steps = kind.build().step_names().join(", ");
                println!(
                    "{:<16} {} [{steps}] (default: {})",
                    kind.name(),
                    kind.title(),
                    kind.final_step().step()
                );
            }
        }
    }
    Ok(())
}

fn describe(kind: ExperimentKind) -> Value {
    json!({
        "name": kind.name(),
        "title": kind.title(),
        "data_file": format!("{}.json", kind.data_name()),
        "final_step": kind.final_step().step(),
        "steps": kind.build().step_names(),
    })
}
