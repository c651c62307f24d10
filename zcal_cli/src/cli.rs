//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "zcal",
    version,
    about = "PCB transmission-line impedance calculator",
    long_about = "Characteristic impedance for microstrip, stripline, coaxial and \
                  differential-pair geometries.\n\n\
                  Field labels, units, defaults and ranges come from the built-in \
                  schema registry; lengths are in mil."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one calculation.
    Calc(CalcArgs),

    /// Prompt for each field, then calculate.
    Interactive {
        /// Geometry type (asked for when omitted).
        geometry: Option<String>,
    },

    /// Show field schemas.
    Forms {
        /// Geometry type (all when omitted).
        geometry: Option<String>,
    },

    /// Show the substrate material catalogue.
    Materials {
        /// Material key (all when omitted).
        key: Option<String>,
    },

    /// Print the formula reference.
    Formulas,

    /// Dispatch one request through the endpoint layer.
    Api(ApiArgs),
}

#[derive(Debug, Args)]
pub struct CalcArgs {
    /// Geometry type: microstrip, stripline, coaxial or differential.
    pub geometry: String,

    /// Field value, repeatable (e.g. --set width=10).
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Fill the dielectric field from a catalogue material.
    #[arg(long, value_name = "KEY")]
    pub material: Option<String>,

    /// Print the result (or error) as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// HTTP method, e.g. GET or POST.
    pub method: String,

    /// Request path, e.g. /form/microstrip.
    pub path: String,

    /// JSON request body.
    #[arg(long, value_name = "JSON")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Json,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
