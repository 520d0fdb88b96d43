use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regform::app::{handle_fatal_error, init_logging, AppConfig};
use regform::{Draft, FormDefinition, FormEngine};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Convert registration form drafts to bundles and back
#[derive(Parser)]
#[command(name = "regform")]
#[command(about = "Declarative registration form engine", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a form definition
    Validate {
        /// Form definition (.json, .yaml or .yml)
        form: PathBuf,
    },
    /// Show visibility, requiredness and disabled state of a section's fields
    Visible {
        form: PathBuf,
        section: String,
        /// Draft JSON: section id to field name to value
        draft: PathBuf,
    },
    /// Convert a draft into a bundle
    Mutate {
        form: PathBuf,
        draft: PathBuf,
        /// Only this section
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Convert a bundle back into draft values
    Query {
        form: PathBuf,
        bundle: PathBuf,
        /// Only this section
        #[arg(short, long)]
        section: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let app = AppConfig::new(cli.verbose).with_config_path(cli.config.clone());
    init_logging(&app);

    if let Err(e) = run(cli.command, &app) {
        handle_fatal_error(e, app.verbose);
    }
}

fn run(command: Commands, app: &AppConfig) -> Result<()> {
    match command {
        Commands::Validate { form } => {
            let engine = load_engine(&form, app)?;
            let report = engine.report();
            print_json(&json!({
                "event": engine.form().event,
                "version": engine.form().version,
                "valid": report.is_valid(),
                "sections": report.sections,
                "fields": report.fields,
            }))
        }
        Commands::Visible {
            form,
            section,
            draft,
        } => {
            let engine = load_engine(&form, app)?;
            let draft = read_draft(&draft)?;
            let states = engine.get_visible_fields(&section, &draft)?;
            print_json(&serde_json::to_value(states)?)
        }
        Commands::Mutate {
            form,
            draft,
            section,
        } => {
            let engine = load_engine(&form, app)?;
            let draft = read_draft(&draft)?;
            let outcome = match section {
                Some(id) => engine.mutate_section(&id, &draft)?,
                None => engine.mutate_form(&draft),
            };
            if !outcome.is_complete() {
                warn!("{} field(s) left out of the bundle", outcome.failures.len());
            }
            let failures: Vec<Value> = outcome
                .failures
                .iter()
                .map(|f| {
                    json!({
                        "section": f.section,
                        "field": f.field,
                        "code": f.error.code(),
                        "error": f.error.user_message(),
                    })
                })
                .collect();
            print_json(&json!({"bundle": outcome.fragment, "failures": failures}))
        }
        Commands::Query {
            form,
            bundle,
            section,
        } => {
            let engine = load_engine(&form, app)?;
            let bundle = read_json(&bundle)?;
            match section {
                Some(id) => print_json(&serde_json::to_value(engine.query_section(&id, &bundle)?)?),
                None => print_json(engine.query_form(&bundle).as_value()),
            }
        }
    }
}

fn load_engine(form: &Path, app: &AppConfig) -> Result<FormEngine> {
    let config = app.engine_config()?;
    debug!("Engine configuration: {:?}", config);
    let definition = FormDefinition::from_path(form)
        .with_context(|| format!("Failed to load form definition {}", form.display()))?;
    FormEngine::new(definition, config)
        .with_context(|| format!("Form definition {} is invalid", form.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_draft(path: &Path) -> Result<Draft> {
    Ok(Draft::from_value(read_json(path)?)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
