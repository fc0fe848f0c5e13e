//! sbom-graph: turn CycloneDX and SPDX SBOMs into graph records.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_graph::{
    cli::{self, exit_codes, ExtractOverrides},
    config::{self, AppConfig, ConfigPreset, ErrorPolicy, OutputFormat},
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  CycloneDX: 1.x (JSON)",
        "\n  SPDX:      2.x (JSON)",
        "\n\nOutput Formats:",
        "\n  jsonl, json"
    )
}

#[derive(Parser)]
#[command(name = "sbom-graph")]
#[command(version, long_version = build_long_version())]
#[command(about = "Turn CycloneDX and SPDX SBOMs into graph node and edge records", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  All documents processed
    1  extract: documents that failed to read or write were skipped
       detect: some documents were not recognized
    2  Error occurred

EXAMPLES:
    # Records for every JSON file under a directory, one per line
    sbom-graph extract sboms/

    # Keep going past broken documents
    sbom-graph extract sboms/ --on-error skip -O records.jsonl

    # Fetch a repository's dependency graph from GitHub
    GITHUB_TOKEN=... sbom-graph extract --github octo-org/hello-world")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of the config file (default, lenient, raw)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `extract` subcommand
#[derive(Parser)]
struct ExtractArgs {
    /// SBOM files or directories to read
    paths: Vec<PathBuf>,

    /// GitHub repository (`owner/repo`) to fetch. Can be specified multiple times.
    #[arg(long = "github", value_name = "OWNER/REPO")]
    github: Vec<String>,

    /// Output format
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// What to do with a document that cannot be read or written
    #[arg(long)]
    on_error: Option<ErrorPolicy>,

    /// Keep nested attributes instead of flattening them
    #[arg(long)]
    no_flatten: bool,

    /// Delimiter between flattened attribute key segments
    #[arg(long)]
    delimiter: Option<String>,
}

impl ExtractArgs {
    fn overrides(&self) -> ExtractOverrides {
        ExtractOverrides {
            github_repos: self.github.clone(),
            on_error: self.on_error,
            no_flatten: self.no_flatten,
            delimiter: self.delimiter.clone(),
            format: self.output,
            output_file: self.output_file.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write graph records for SBOM documents
    Extract(ExtractArgs),

    /// Print the detected format of each document
    Detect {
        /// SBOM files or directories to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print one JSON object per document
        #[arg(long)]
        json: bool,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-graph.yaml in the current directory
    Init,
    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>, preset: Option<&str>) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(name) = preset {
        let preset = ConfigPreset::from_name(name).with_context(|| {
            let names: Vec<_> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
            format!("Unknown preset '{name}'. Valid options: {}", names.join(", "))
        })?;
        return Ok((AppConfig::from_preset(preset), None));
    }
    Ok(config::load_or_default(path))
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Extract(args) => {
            let (mut config, loaded_from) = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            if let Some(path) = &loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            args.overrides().apply(&mut config);
            cli::run_extract(args.paths, &config)
        }

        Commands::Detect { paths, json } => {
            let (config, _) = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            cli::run_detect(paths, &config.source, json)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-graph", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    load_config(cli.config.as_deref(), cli.preset.as_deref())?;
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for dir in config::config_search_dirs() {
                    eprintln!("  {}", dir.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbom-graph.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Schema { output } => {
                let schema =
                    config::generate_json_schema().context("failed to serialize schema")?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &schema)?;
                        eprintln!("Schema written to {}", path.display());
                    }
                    None => println!("{schema}"),
                }
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}

fn main() {
    let cli = Cli::parse();

    // Records go to stdout, so all logging goes to stderr
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}
