//! relmap - apply update maps to records from the command line.
//!
//! Reads a schema, a loaded record and a change map (YAML or JSON), and
//! prints the resulting mutation together with the updated record.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use rel_map::{map, Mutation, Record, Schema};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "relmap", version)]
#[command(about = "Turn nested update maps into record mutations")]
struct Cli {
    /// Output location. Use '-' for stdout.
    #[arg(short, long, default_value = "-", global = true)]
    output: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply a change map to a loaded record
    Apply {
        #[arg(short, long)]
        schema: PathBuf,
        /// Table of the record
        #[arg(short, long)]
        table: String,
        #[arg(short, long)]
        record: PathBuf,
        #[arg(short, long)]
        changes: PathBuf,
        /// Ignore nested association values
        #[arg(long)]
        no_cascade: bool,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the debug rendering of a change map
    Show {
        #[arg(short, long)]
        changes: PathBuf,
    },
    /// Validate a schema and list its tables
    Check {
        #[arg(short, long)]
        schema: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct ApplyOutput<'a> {
    mutation: &'a Mutation,
    record: &'a Record,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::Apply {
            schema,
            table,
            record,
            changes,
            no_cascade,
            format,
        } => apply(&schema, &table, &record, &changes, !no_cascade, format, &mut output),
        Command::Show { changes } => show(&changes, &mut output),
        Command::Check { schema } => check(&schema, &mut output),
    }
}

fn read(path: &Path, what: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path).map_err(|e| format!("Failed to read {} file {:?}: {}", what, path, e))?)
}

fn load_schema(path: &Path) -> Result<Schema, Box<dyn std::error::Error>> {
    let content = read(path, "schema")?;
    Ok(Schema::from_yaml(&content)?)
}

fn load_map(path: &Path, what: &str) -> Result<map::Map, Box<dyn std::error::Error>> {
    let content = read(path, what)?;
    Ok(map::from_yaml(&content).map_err(|e| format!("Failed to parse {} file: {}", what, e))?)
}

fn apply(
    schema_file: &Path,
    table: &str,
    record_file: &Path,
    changes_file: &Path,
    cascade: bool,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(load_schema(schema_file)?);
    let loaded = load_map(record_file, "record")?;
    let changes = load_map(changes_file, "changes")?;

    let mut record = Record::load(schema, table, &loaded)?;
    info!(table, changes = %changes, cascade, "applying changes");

    let mutation = changes.build(&mut record, cascade)?;
    let result = ApplyOutput {
        mutation: &mutation,
        record: &record,
    };

    match format {
        Format::Json => writeln!(output, "{}", serde_json::to_string_pretty(&result)?)?,
        Format::Yaml => write!(output, "{}", serde_yaml::to_string(&result)?)?,
    }
    Ok(())
}

fn show(changes_file: &Path, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let changes = load_map(changes_file, "changes")?;
    writeln!(output, "{}", changes)?;
    Ok(())
}

fn check(schema_file: &Path, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_schema(schema_file)?;
    writeln!(output, "Tables in schema:")?;
    for table in &schema.tables {
        writeln!(
            output,
            "  - {} (primary key {}, {} columns, {} associations)",
            table.name,
            table.primary_key,
            table.columns.len(),
            table.associations.len()
        )?;
    }
    Ok(())
}
