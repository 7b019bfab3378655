mod prompt;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_snapshot_core::{UnitReflection, infer_units, validate_units};
use schema_snapshot_store::{
    Action, BoxError, Config, InspectSource, SchemaEntry, Status, StoreError, Workspace,
    contains_hash,
};
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "schema-snapshot")]
#[command(version)]
#[command(about = "Generate type declarations and hash-keyed snapshots of configured schemas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Snapshot a schema's current shape.
    CreateSnapshot(TitledArgs),
    /// Delete a snapshot by hash.
    DeleteSnapshot(DeleteArgs),
    /// Write a schema's current shape as a standalone declaration.
    CreateSingle(SchemaArgs),
    /// Create the single type and a snapshot in one step.
    Init(TitledArgs),
    /// Replace a schema's snapshots with ones inferred from JSON samples.
    Inspect(InspectArgs),
    /// List stored snapshots of a schema.
    List(SchemaArgs),
    /// Check the configuration and every schema's units.
    Validate(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to the YAML configuration.
    #[arg(long, default_value = "snapshots.yml")]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Configured schema name.
    #[arg(long)]
    schema: String,
}

#[derive(Debug, Args)]
struct TitledArgs {
    #[command(flatten)]
    target: SchemaArgs,
    /// Snapshot title; asked on stdin when omitted.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[command(flatten)]
    target: SchemaArgs,
    /// Hash of the snapshot to delete; asked on stdin when omitted.
    #[arg(long)]
    hash: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    target: SchemaArgs,
    /// JSON file holding one sample object or an array of them.
    #[arg(long)]
    data: PathBuf,
    /// Title given to every inspected snapshot.
    #[arg(long)]
    title: Option<String>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::CreateSnapshot(args) => run_create_snapshot(args),
        Command::DeleteSnapshot(args) => run_delete_snapshot(args),
        Command::CreateSingle(args) => run_create_single(args),
        Command::Init(args) => run_init(args),
        Command::Inspect(args) => run_inspect(args),
        Command::List(args) => run_list(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_create_snapshot(args: TitledArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.target.config.config)?;
    let schema = find_schema(&config, &args.target.schema)?;
    let title = title_or_prompt(args.title)?;
    execute(&workspace, schema, Action::CreateSnapshot { title }, None)
}

fn run_delete_snapshot(args: DeleteArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.target.config.config)?;
    let schema = find_schema(&config, &args.target.schema)?;

    let hash = match args.hash {
        Some(hash) => hash,
        None => {
            let snapshots = workspace.list(schema).map_err(|e| e.to_string())?;
            if snapshots.is_empty() {
                return Err(format!("schema {} has no snapshots", schema.name));
            }
            for snapshot in &snapshots {
                eprintln!("  {}  {}", snapshot.hash, snapshot.title);
            }
            prompt_stdin("Insert the hash of a snapshot to delete: ", |answer| {
                if contains_hash(&snapshots, answer) {
                    Ok(())
                } else {
                    Err(format!("Snapshot with hash {answer} was not found"))
                }
            })?
        }
    };

    execute(&workspace, schema, Action::DeleteSnapshot { hash }, None)
}

fn run_create_single(args: SchemaArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.config.config)?;
    let schema = find_schema(&config, &args.schema)?;
    execute(&workspace, schema, Action::CreateSingle, None)
}

fn run_init(args: TitledArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.target.config.config)?;
    let schema = find_schema(&config, &args.target.schema)?;
    let title = title_or_prompt(args.title)?;
    execute(&workspace, schema, Action::CreateSingleAndSnapshot { title }, None)
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.target.config.config)?;
    let schema = find_schema(&config, &args.target.schema)?;
    let mut source = JsonSamples::new(args.data);
    let action = Action::Inspect { title: args.title };
    execute(&workspace, schema, action, Some(&mut source))
}

fn run_list(args: SchemaArgs) -> Result<(), String> {
    let (config, workspace) = open_workspace(&args.config.config)?;
    let schema = find_schema(&config, &args.schema)?;
    let snapshots = workspace.list(schema).map_err(|e| e.to_string())?;

    if snapshots.is_empty() {
        println!("No snapshots for schema {}.", schema.name);
        return Ok(());
    }
    for snapshot in &snapshots {
        println!("{}  {}", snapshot.hash, snapshot.title);
    }
    println!("{} snapshot(s) for schema {}.", snapshots.len(), schema.name);
    Ok(())
}

fn run_validate(args: ConfigArgs) -> Result<(), String> {
    let config = load_config(&args.config)?;

    let mut problems = 0;
    for schema in &config.schemas {
        for finding in validate_units(&schema.units) {
            eprintln!("  {}: {finding}", schema.name);
            problems += 1;
        }
    }
    if problems > 0 {
        return Err(format!("{problems} problem(s) found in schema units"));
    }

    println!("Validated {} schema(s).", config.schemas.len());
    Ok(())
}

fn load_config(path: &Path) -> Result<Config, String> {
    let mut config = Config::load(path)
        .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?;
    config.validate().map_err(|e| e.to_string())?;

    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_dirs(base);
    Ok(config)
}

fn open_workspace(path: &Path) -> Result<(Config, Workspace), String> {
    let config = load_config(path)?;
    let workspace = Workspace::from_config(&config);
    workspace.ensure_dirs().map_err(|e| e.to_string())?;
    Ok((config, workspace))
}

fn find_schema<'a>(config: &'a Config, name: &str) -> Result<&'a SchemaEntry, String> {
    config.require_schema(name).map_err(|_| {
        format!(
            "unknown schema {name}; available: {}",
            config.schema_names().join(", ")
        )
    })
}

fn title_or_prompt(title: Option<String>) -> Result<String, String> {
    match title {
        Some(title) => Ok(title),
        None => prompt_stdin("Insert the title of a snapshot: ", prompt::non_empty),
    }
}

fn prompt_stdin<F>(question: &str, check: F) -> Result<String, String>
where
    F: Fn(&str) -> Result<(), String>,
{
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stderr();
    prompt::ask(&mut input, &mut output, question, check)
}

fn execute(
    workspace: &Workspace,
    schema: &SchemaEntry,
    action: Action,
    source: Option<&mut dyn InspectSource>,
) -> Result<(), String> {
    let statuses = workspace
        .execute(schema, action, source)
        .map_err(|e| e.to_string())?;

    let mut failure: Option<Status> = None;
    for status in statuses {
        if status.is_failure() {
            failure = Some(status);
        } else {
            println!("{status}");
        }
    }
    match failure {
        Some(status) => Err(status.to_string()),
        None => Ok(()),
    }
}

/// Inspect source reading sample documents from a JSON file.
///
/// The file holds either one object or an array of objects; each object
/// becomes one batch of inferred units.
struct JsonSamples {
    path: PathBuf,
    loaded: Option<usize>,
}

impl JsonSamples {
    fn new(path: PathBuf) -> Self {
        Self { path, loaded: None }
    }
}

impl InspectSource for JsonSamples {
    fn load_data(&mut self) -> Result<Vec<Vec<UnitReflection>>, BoxError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|err| format!("Failed to read '{}': {err}", self.path.display()))?;
        let document: serde_json::Value =
            serde_json::from_str(&raw).map_err(StoreError::from)?;

        let batches = match document {
            serde_json::Value::Array(samples) => samples
                .iter()
                .map(infer_units)
                .collect::<Result<Vec<_>, _>>()?,
            sample => vec![infer_units(&sample)?],
        };
        self.loaded = Some(batches.len());
        Ok(batches)
    }

    fn cleanup(&mut self) -> Result<(), BoxError> {
        if let Some(count) = self.loaded.take() {
            tracing::debug!(path = %self.path.display(), count, "released inspected samples");
        }
        Ok(())
    }
}
