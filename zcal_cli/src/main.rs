//! # zcal CLI Application
//!
//! Terminal front end for the impedance engine in `zcal_core`.
//!
//! ```text
//! zcal calc microstrip --set width=10 --set height=62
//! zcal calc differential --set width=10 --set height=62 --set spacing=6 --material FR4 --json
//! zcal interactive coaxial
//! zcal forms stripline
//! zcal api GET /materials
//! ```

mod cli;
mod commands;
mod logging;

use clap::Parser;
use zcal_core::AppConfig;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_api, run_calc, run_formulas, run_forms, run_interactive, run_materials};
use crate::logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();

    let format = match cli.log_format {
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    if let Err(error) = init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(format)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Calc(args) => run_calc(args, &config),
        Command::Interactive { geometry } => run_interactive(geometry.as_deref(), &config),
        Command::Forms { geometry } => run_forms(geometry.as_deref()),
        Command::Materials { key } => run_materials(key.as_deref()),
        Command::Formulas => run_formulas(),
        Command::Api(args) => run_api(args, &config),
    }
}
