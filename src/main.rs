//! kerndiff: Incremental semantic comparison of kernel functions
//!
//! Drives an SMT-backed function analyzer across module pairs, caching
//! confirmed equalities between invocations.

#![allow(clippy::too_many_lines)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kerndiff::{
    cli,
    config::{self, CompareConfig, OutputFormat, Plan},
};
use std::io::{self, Write as _};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with wire format info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nAnalyzer wire format:",
        "\n  YAML comparison records on stdout, kebab-case keys",
        "\n\nOutput Formats:",
        "\n  summary, json, yaml",
        "\n\nFeatures:",
        "\n  Incremental comparison graph, equality caching, call-path reporting"
    )
}

#[derive(Parser)]
#[command(name = "kerndiff")]
#[command(version, long_version = build_long_version())]
#[command(about = "Incremental semantic comparison of kernel functions", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  All compared functions are semantically equal
    1  Differences found or functions left undecided
    2  Analyzer failures degraded the verdict
    3  Error occurred

EXAMPLES:
    # Compare two entry functions across two module builds
    kerndiff compare --analyzer semdiff --left old/net.ll --right new/net.ll \\
        -f e1000_probe -f e1000_remove

    # Run a multi-pair plan with a persistent equality cache
    kerndiff compare --plan kernel-diff.yaml --cache-dir ~/.cache/kerndiff

    # JSON report for CI
    kerndiff compare --plan plan.yaml -o json -O report.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `compare` subcommand
#[derive(Parser)]
struct CompareArgs {
    /// Comparison plan file (YAML, one entry per module pair)
    #[arg(long, conflicts_with_all = ["left", "right", "functions"])]
    plan: Option<PathBuf>,

    /// Left (old) module file
    #[arg(long, requires = "right")]
    left: Option<PathBuf>,

    /// Right (new) module file
    #[arg(long, requires = "left")]
    right: Option<PathBuf>,

    /// Entry function to compare; may be repeated
    #[arg(long = "function", short = 'f', value_name = "NAME")]
    functions: Vec<String>,

    /// Analyzer executable invoked once per entry function
    #[arg(long, env = "KERNDIFF_ANALYZER")]
    analyzer: Option<PathBuf>,

    /// Extra argument passed through to the analyzer; may be repeated
    #[arg(long = "analyzer-arg", value_name = "ARG")]
    analyzer_args: Vec<String>,

    /// Root directory for persistent equality caches
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Keep equality caches under the default cache root
    #[arg(long)]
    keep_cache: bool,

    /// Report format
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Report file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Worker threads for independent comparison groups
    #[arg(long)]
    jobs: Option<usize>,

    /// Abort at the first fatal group error
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare entry functions of one or more module pairs
    Compare(CompareArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config or plan file format
    Schema {
        /// Which schema to print
        #[arg(value_enum)]
        kind: SchemaKind,

        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate a man page and print it to stdout
    Man,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SchemaKind {
    /// Settings file schema
    Config,
    /// Plan file schema
    Plan,
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .kerndiff.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let ansi = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(ansi),
        )
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Compare(args) => {
            let file_config = match cli.config.as_deref() {
                Some(path) => config::load_config_file(path)?,
                None => config::load_or_default().0,
            };
            let effective = merge_compare_config(file_config, &args);
            let plan = resolve_plan(&args)?;

            let exit_code = cli::run_compare(&effective, &plan)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "kerndiff", &mut io::stdout());
            Ok(())
        }

        Commands::Schema { kind, output } => {
            let schema = match kind {
                SchemaKind::Config => config::config_schema_json(),
                SchemaKind::Plan => config::plan_schema_json(),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (effective, loaded_from) = match cli.config.as_deref() {
                    Some(path) => (config::load_config_file(path)?, Some(path.to_path_buf())),
                    None => config::load_or_default(),
                };
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml_ng::to_string(&effective).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("kerndiff").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                let active = cli.config.clone().or_else(config::discover_config_file);
                match active {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".kerndiff.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },

        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buf = Vec::new();
            man.render(&mut buf).context("failed to render man page")?;
            io::stdout().write_all(&buf)?;
            Ok(())
        }
    }
}

/// Overlay command-line flags onto the file configuration.
fn merge_compare_config(mut config: CompareConfig, args: &CompareArgs) -> CompareConfig {
    if args.analyzer.is_some() {
        config.analyzer = args.analyzer.clone();
    }
    if !args.analyzer_args.is_empty() {
        config.analyzer_args = args.analyzer_args.clone();
    }
    if args.cache_dir.is_some() {
        config.cache_dir = args.cache_dir.clone();
    }
    if args.keep_cache {
        config.keep_cache = true;
    }
    if let Some(format) = args.output {
        config.output.format = format;
    }
    if args.output_file.is_some() {
        config.output.file = args.output_file.clone();
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    config
}

/// Build the comparison plan from either a plan file or inline flags.
fn resolve_plan(args: &CompareArgs) -> Result<Plan> {
    if let Some(path) = &args.plan {
        return Ok(Plan::from_file(path)?);
    }
    match (&args.left, &args.right) {
        (Some(left), Some(right)) => {
            if args.functions.is_empty() {
                anyhow::bail!("no entry functions; pass at least one --function");
            }
            Ok(Plan::single(
                left.clone(),
                right.clone(),
                args.functions.clone(),
            ))
        }
        _ => anyhow::bail!("nothing to compare; pass --plan or --left/--right with --function"),
    }
}
