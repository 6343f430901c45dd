use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webext_schema_core::{SchemaDocument, validate_document};
use webext_schema_mock::{Channel, MockConfig, MockTree, synthesize_with};

/// CLI-specific release channel enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliChannel {
    Beta,
    Central,
    Release,
    Esr,
    Mail,
}

impl From<CliChannel> for Channel {
    fn from(channel: CliChannel) -> Self {
        match channel {
            CliChannel::Beta => Self::Beta,
            CliChannel::Central => Self::Central,
            CliChannel::Release => Self::Release,
            CliChannel::Esr => Self::Esr,
            CliChannel::Mail => Self::Mail,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "webext-schema")]
#[command(about = "Inspect WebExtension API schema documents and synthesize mock trees")]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the file keys of a schema document.
    List(SourceArgs),
    /// Print the namespace definitions stored under one file key.
    Get(GetArgs),
    /// Check a schema document for structural defects.
    Validate(SourceArgs),
    /// Synthesize a mock tree and print it as JSON.
    Mock(MockArgs),
    /// Write a default mock configuration file.
    InitConfig(InitConfigArgs),
}

/// Where to read the schema document from: an explicit file, or a
/// per-channel tree laid out as `<dir>/<channel>/webext.json`.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Path to a unified schema JSON document.
    #[arg(long, required_unless_present = "schemas_dir", conflicts_with = "schemas_dir")]
    schema: Option<PathBuf>,
    /// Root of a per-channel schema tree.
    #[arg(long)]
    schemas_dir: Option<PathBuf>,
    /// Release channel selecting the document under --schemas-dir.
    #[arg(long, value_enum, requires = "schemas_dir")]
    channel: Option<CliChannel>,
}

impl SourceArgs {
    /// Resolves the document path; `fallback` applies when no --channel is given.
    fn document_path(&self, fallback: Channel) -> Result<PathBuf, String> {
        match (&self.schema, &self.schemas_dir) {
            (Some(schema), _) => Ok(schema.clone()),
            (None, Some(dir)) => {
                let channel = self.channel.map(Channel::from).unwrap_or(fallback);
                Ok(channel.schema_path(dir))
            }
            (None, None) => Err("Specify --schema or --schemas-dir".to_string()),
        }
    }
}

#[derive(Debug, Args)]
struct GetArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// File key or namespace-like name (e.g. browser_action.json, browserAction).
    name: String,
}

#[derive(Debug, Args)]
struct MockArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Optional YAML configuration (channel and alias allow-list).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Only print the sub-tree at this dotted path (e.g. runtime.Port).
    #[arg(long)]
    path: Option<String>,
    /// Write the JSON to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Output YAML path.
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::List(args) => run_list(args),
        Command::Get(args) => run_get(args),
        Command::Validate(args) => run_validate(args),
        Command::Mock(args) => run_mock(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<SchemaDocument, String> {
    SchemaDocument::from_path(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn load_source(source: &SourceArgs, fallback: Channel) -> Result<SchemaDocument, String> {
    load_document(&source.document_path(fallback)?)
}

fn run_list(args: SourceArgs) -> Result<(), String> {
    let document = load_source(&args, Channel::default())?;
    for key in document.list() {
        println!("{key}");
    }
    Ok(())
}

fn run_get(args: GetArgs) -> Result<(), String> {
    let document = load_source(&args.source, Channel::default())?;
    let definitions = document
        .get(&args.name)
        .ok_or_else(|| format!("No schema entry matching '{}'", args.name))?;
    let raw = serde_json::to_string_pretty(definitions)
        .map_err(|err| format!("Failed to serialize definitions: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_validate(args: SourceArgs) -> Result<(), String> {
    let document = load_source(&args, Channel::default())?;
    let errors = validate_document(&document);
    if errors.is_empty() {
        println!("Validated {} schema file(s).", document.len());
        return Ok(());
    }
    for err in &errors {
        println!("{err}");
    }
    Err(format!("{} validation error(s) found", errors.len()))
}

fn run_mock(args: MockArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => MockConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => MockConfig::default(),
    };
    let document = load_source(&args.source, config.channel)?;
    let tree = synthesize_with(&document, &config).map_err(|err| err.to_string())?;

    let value = render(&tree, args.path.as_deref())?;
    let raw = serde_json::to_string_pretty(&value)
        .map_err(|err| format!("Failed to serialize mock tree: {err}"))?;

    match &args.output {
        Some(output) => {
            fs::write(output, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
            info!(output = %output.display(), stubs = tree.sandbox().len(), "Wrote mock tree");
            println!(
                "Synthesized {} namespace(s) with {} stub(s) into '{}'.",
                tree.namespaces().len(),
                tree.sandbox().len(),
                output.display()
            );
        }
        None => println!("{raw}"),
    }
    Ok(())
}

fn render(tree: &MockTree, path: Option<&str>) -> Result<serde_json::Value, String> {
    match path {
        Some(path) => tree
            .lookup(path)
            .map(|id| tree.node_to_json(id))
            .ok_or_else(|| format!("No node at path '{path}'")),
        None => Ok(tree.to_json()),
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    MockConfig::default()
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}
