use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    init::{self, InitArgs},
    list,
    run::{self, RunArgs},
    set::{self, SetArgs},
};
use phylab_exp::{LabConfig, OutputFormat};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "phylab", about = "Physics lab data processing")]
struct Cli {
    /// YAML configuration file (defaults to ./phylab.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the experiment data files.
    #[arg(long, global = true)]
    target_dir: Option<PathBuf>,
    /// Report rendering: text or json.
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List experiments and their declared steps.
    List,
    /// Write the data template for an experiment if none exists.
    Init(InitArgs),
    /// Store measurements in an experiment data file.
    Set(SetArgs),
    /// Load data and run a step with all of its prerequisites.
    Run(RunArgs),
}

/// Settings after applying command line overrides to the config file.
pub struct Settings {
    pub target_dir: PathBuf,
    pub format: OutputFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = LabConfig::load(cli.config.as_deref())?;
    logging::init(&config.log_level);
    let settings = Settings {
        target_dir: cli.target_dir.unwrap_or(config.target_dir),
        format: cli.format.unwrap_or(config.format),
    };
    match cli.command {
        Command::List => list::run(&settings),
        Command::Init(args) => init::run(&args, &settings),
        Command::Set(args) => set::run(&args, &settings),
        Command::Run(args) => run::run(&args, &settings),
    }
}
