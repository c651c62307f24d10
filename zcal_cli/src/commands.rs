//! Subcommand implementations.
//!
//! Each `run_*` returns the process exit code; errors that prevent the
//! command from running at all propagate as `anyhow::Error`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use zcal_core::backend::{self, CalculationBackend};
use zcal_core::equations::generate_equations_markdown;
use zcal_core::materials::{get_material, list_materials, Material};
use zcal_core::schema::{all_forms, form_definition, FormDefinition};
use zcal_core::units::{Mils, Millimeters};
use zcal_core::{
    ApiService, AppConfig, CalcError, CalculationResult, ErrorInfo, GeometryType, Orchestrator,
    ResultCache,
};

use crate::cli::{ApiArgs, CalcArgs};

type Form = Orchestrator<Box<dyn CalculationBackend>>;

fn build_form(config: &AppConfig) -> Result<Form> {
    let backend = backend::from_config(&config.backend).context("selecting calculation backend")?;
    info!(backend = backend.name(), "backend ready");
    let cache = Arc::new(ResultCache::from_config(&config.cache));
    Ok(Orchestrator::new(backend, cache))
}

// =============================================================================
// calc
// =============================================================================

pub fn run_calc(args: &CalcArgs, config: &AppConfig) -> Result<i32> {
    let mut form = build_form(config)?;
    form.select_geometry_by_key(&args.geometry)?;

    if let Some(key) = &args.material {
        let material = form.select_material(key)?;
        if !args.json {
            println!("Material: {} (εr = {})", material.name, material.dielectric);
        }
    }
    for (key, value) in &args.set {
        form.set_field(key, value.as_str())?;
    }

    Ok(report(form.submit(), args.json))
}

/// Print a submission outcome; returns the exit code.
fn report(outcome: Result<CalculationResult, CalcError>, json: bool) -> i32 {
    match outcome {
        Ok(result) => {
            if json {
                print_json(&result);
            } else {
                print_result(&result);
            }
            0
        }
        Err(err) => {
            let info = ErrorInfo::from(&err);
            if json {
                print_json(&info);
            } else {
                print_error(&info);
            }
            1
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: cannot serialize output: {e}"),
    }
}

fn print_result(result: &CalculationResult) {
    println!("═══════════════════════════════════════");
    println!("  IMPEDANCE RESULT");
    println!("═══════════════════════════════════════");
    for line in result.summary() {
        println!("  {line}");
    }
    println!("═══════════════════════════════════════");
}

fn print_error(info: &ErrorInfo) {
    eprintln!("Error [{}]: {}", info.code, info.message);
    eprintln!("  {}", info.detail);
    for (field, message) in &info.field_errors {
        eprintln!("  - {field}: {message}");
    }
}

// =============================================================================
// interactive
// =============================================================================

pub fn run_interactive(geometry: Option<&str>, config: &AppConfig) -> Result<i32> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let geometry = match geometry {
        Some(key) => key.parse::<GeometryType>()?,
        None => prompt_geometry(&mut input, &mut output)?,
    };

    let mut form = build_form(config)?;
    form.select_geometry(geometry)?;
    writeln!(output, "{} - {}", geometry.display_name(), geometry.description())?;
    fill_fields(&mut form, &mut input, &mut output)?;
    writeln!(output)?;

    Ok(report(form.submit(), false))
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_geometry<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<GeometryType> {
    for (i, geometry) in GeometryType::ALL.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, geometry.display_name())?;
    }
    let answer = prompt_line(input, output, "Geometry [1]: ")?;
    if answer.is_empty() {
        return Ok(GeometryType::Microstrip);
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=GeometryType::ALL.len()).contains(&n) => Ok(GeometryType::ALL[n - 1]),
        _ => Ok(answer.parse::<GeometryType>()?),
    }
}

/// Ask for every field; an empty answer keeps the default.
fn fill_fields<B, R, W>(form: &mut Orchestrator<B>, input: &mut R, output: &mut W) -> Result<()>
where
    B: CalculationBackend,
    R: BufRead,
    W: Write,
{
    let prompts: Vec<(String, String)> = form
        .state()
        .fields
        .iter()
        .map(|field| {
            let def = &field.definition;
            let unit = if def.unit.is_empty() { String::new() } else { format!(" ({})", def.unit) };
            let default = def.default_value.map(|d| format!(" [{d}]")).unwrap_or_default();
            (def.key.clone(), format!("{}{}{}: ", def.label, unit, default))
        })
        .collect();

    for (key, prompt) in prompts {
        let answer = prompt_line(input, output, &prompt)?;
        if !answer.is_empty() {
            form.set_field(&key, answer.as_str())?;
        }
    }
    Ok(())
}

// =============================================================================
// forms / materials / formulas
// =============================================================================

pub fn run_forms(geometry: Option<&str>) -> Result<i32> {
    let forms = match geometry {
        Some(key) => vec![form_definition(key.parse()?)],
        None => all_forms(),
    };
    for form in &forms {
        print_form(form);
    }
    Ok(0)
}

fn print_form(form: &FormDefinition) {
    println!("{} ({})", form.name, form.geometry);
    println!("  {}", form.description);
    for field in &form.fields {
        let default = field
            .default_value
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<11} {:<26} {:<4} default {:<6} range [{}, {}]",
            field.key, field.label, field.unit, default, field.min, field.max
        );
        if field.unit == "mil" {
            println!(
                "  {:<11} {:<26}      metric range [{}, {}]",
                "",
                "",
                Millimeters::from(Mils(field.min)),
                Millimeters::from(Mils(field.max))
            );
        }
    }
    println!();
}

pub fn run_materials(key: Option<&str>) -> Result<i32> {
    match key {
        Some(key) => print_material(key, get_material(key)?),
        None => {
            for (key, material) in list_materials() {
                print_material(key, material);
            }
        }
    }
    Ok(0)
}

fn print_material(key: &str, material: &Material) {
    println!(
        "{:<13} εr {:<5} tanδ {:<7} @ {:<7} {} - {}",
        key, material.dielectric, material.tan_d, material.frequency, material.name, material.description
    );
}

pub fn run_formulas() -> Result<i32> {
    print!("{}", generate_equations_markdown());
    Ok(0)
}

// =============================================================================
// api
// =============================================================================

pub fn run_api(args: &ApiArgs, config: &AppConfig) -> Result<i32> {
    let api = ApiService::from_config(&config.cache);
    let response = api.handle(&args.method, &args.path, args.body.as_deref());
    println!("{}", response.status);
    print_json(&response.body);
    Ok(if response.is_success() { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zcal_core::{LocalBackend, Phase};

    fn local_form() -> Orchestrator<LocalBackend> {
        Orchestrator::new(LocalBackend, Arc::new(ResultCache::new(false)))
    }

    #[test]
    fn test_fill_fields_keeps_defaults_on_empty_answer() {
        let mut form = local_form();
        form.select_geometry(GeometryType::Coaxial).unwrap();
        let mut input = Cursor::new("20\n46\n\n");
        let mut output = Vec::new();

        fill_fields(&mut form, &mut input, &mut output).unwrap();

        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Inner Conductor Diameter (mil): "));
        assert!(prompts.contains("Relative Permittivity [2.25]: "));
        assert_eq!(form.submit().unwrap().impedance, 66.56);
        assert_eq!(form.phase(), Phase::Success);
    }

    #[test]
    fn test_prompt_geometry_by_number_and_name() {
        let mut output = Vec::new();
        let picked = prompt_geometry(&mut Cursor::new("3\n"), &mut output).unwrap();
        assert_eq!(picked, GeometryType::Coaxial);
        let picked = prompt_geometry(&mut Cursor::new("stripline\n"), &mut output).unwrap();
        assert_eq!(picked, GeometryType::Stripline);
        let picked = prompt_geometry(&mut Cursor::new("\n"), &mut output).unwrap();
        assert_eq!(picked, GeometryType::Microstrip);
        assert!(prompt_geometry(&mut Cursor::new("9\n"), &mut output).is_err());
    }

    #[test]
    fn test_report_exit_codes() {
        let ok = Ok(CalculationResult::new(GeometryType::Coaxial, 66.56));
        assert_eq!(report(ok, true), 0);
        assert_eq!(report(Err(CalcError::missing_parameter("width")), true), 1);
    }
}
