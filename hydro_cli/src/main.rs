//! # hydro_cli
//!
//! Command-line front end for the `hydro_core` sizing engine.
//!
//! ```text
//! hydro_cli template > project.json
//! hydro_cli calculate project.json
//! hydro_cli calculate project.json --module sewage --json
//! hydro_cli checklist project.json
//! hydro_cli modules
//! ```
//!
//! Logs go to stderr (`RUST_LOG` or `--verbose`), so JSON on stdout stays clean.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hydro_core::calculations::{calculate_module, calculate_project, ModuleKind};
use hydro_core::compliance::evaluate;
use hydro_core::project::ProjectConfiguration;
use hydro_core::report::{ModuleReport, ProjectReport};

#[derive(Parser)]
#[command(name = "hydro_cli", version, about = "Building plumbing, drainage and gas sizing")]
struct Cli {
    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Size the enabled modules of a project file
    Calculate {
        file: PathBuf,
        /// Size a single module, e.g. `cold_water` or `fuel_gas`
        #[arg(short, long, value_parser = parse_module)]
        module: Option<ModuleKind>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the normative checklist of a project file
    Checklist {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the default project configuration
    Template,
    /// List the available modules and the standards they follow
    Modules,
}

fn parse_module(s: &str) -> Result<ModuleKind, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
        let known: Vec<String> = ModuleKind::ALL
            .iter()
            .filter_map(|k| serde_json::to_value(k).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        format!("unknown module '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_project(file: &Path) -> Result<ProjectConfiguration> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let config = ProjectConfiguration::from_json(&text).with_context(|| format!("parsing {}", file.display()))?;
    tracing::info!(project = %config.meta.name, modules = config.enabled_modules.len(), "project loaded");
    Ok(config)
}

fn print_module(module: &ModuleReport) {
    println!("═══════════════════════════════════════");
    println!("  {}", module.name.to_uppercase());
    println!("═══════════════════════════════════════");
    for standard in &module.standards {
        println!("  {} - {}", standard.code, standard.description);
    }
    println!();
    println!("Results:");
    for r in &module.results {
        println!("  {:<40} {} {}", r.label, r.value, r.unit);
    }
    println!();
    println!("Calculation steps:");
    for (i, step) in module.steps.iter().enumerate() {
        match &step.reference {
            Some(reference) => println!("  {}. {} [{}]", i + 1, step.description, reference),
            None => println!("  {}. {}", i + 1, step.description),
        }
        for line in step.detail.lines() {
            println!("       {}", line);
        }
    }
    if !module.suggestions.is_empty() {
        println!();
        println!("Suggestions:");
        for s in &module.suggestions {
            println!("  - {}", s);
        }
    }
    if !module.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &module.warnings {
            println!("  [{:?}] {}", w.code, w.message);
        }
    }
    println!();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Calculate { file, module, json } => {
            let config = load_project(&file)?;
            let report = match module {
                Some(kind) => ProjectReport {
                    modules: vec![calculate_module(kind, &config).context("calculation failed")?],
                },
                None => calculate_project(&config).context("calculation failed")?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for m in &report.modules {
                    print_module(m);
                }
            }
        }
        Command::Checklist { file, json } => {
            let config = load_project(&file)?;
            let report = calculate_project(&config).context("calculation failed")?;
            let items = evaluate(&report);
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in &items {
                    println!(
                        "  [{:<7}] {:<15} {:<10} {}",
                        item.status.label(),
                        item.id,
                        item.standard,
                        item.description
                    );
                    println!("            {}", item.justification);
                }
            }
        }
        Command::Template => {
            println!("{}", ProjectConfiguration::new("New project", "").to_json()?);
        }
        Command::Modules => {
            for kind in ModuleKind::ALL {
                let codes: Vec<&str> = kind.standards().iter().map(|(code, _)| *code).collect();
                println!("  {:<22} {} ({})", kind.display_name(), kind.description(), codes.join(", "));
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
