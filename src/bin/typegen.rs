//! Type Generator CLI
//!
//! Compiles JSON schemas into Rust types and checks generated files for drift.
//!
//! Usage:
//!   typegen generate schemas/ -o src/generated
//!   typegen check schemas/ --against src/generated/contracts.rs
//!   typegen model schemas/person.json
//!   typegen config

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use jsonschema_typegen::{codegen, loader, Checksum, GeneratedOutput, TypegenConfig};
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "typegen")]
#[command(about = "Generate Rust types from JSON schemas")]
struct Cli {
    /// Config file to load on top of the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Package name (overrides the configured one)
    #[arg(short, long, global = true)]
    package: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schemas and write `<package>.rs`
    Generate {
        /// Schema file or directory of `*.json` schemas
        source: PathBuf,

        /// Output directory (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the generated code instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Regenerate and compare against an existing file
    Check {
        /// Schema file or directory of `*.json` schemas
        source: PathBuf,

        /// Previously generated file
        #[arg(long)]
        against: PathBuf,
    },

    /// Print the compiled type model as JSON
    Model {
        /// Schema file or directory of `*.json` schemas
        source: PathBuf,
    },

    /// Show the effective configuration as TOML
    Config {
        /// Write it to this path instead of stdout
        #[arg(long)]
        init: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = TypegenConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(package) = cli.package {
        config.generation.package = package;
    }

    match cli.command {
        Commands::Generate { source, output, dry_run } => generate(&config, &source, output, dry_run),
        Commands::Check { source, against } => check(&config, &source, &against),
        Commands::Model { source } => model(&config, &source),
        Commands::Config { init } => match init {
            Some(path) => {
                config.save(&path).with_context(|| format!("Failed to write {}", path))?;
                println!("Wrote configuration to {}", path);
                Ok(())
            }
            None => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        },
    }
}

/// Load, compile and render the schemas under `source`
fn render(config: &TypegenConfig, source: &Path) -> anyhow::Result<GeneratedOutput> {
    let sources = loader::load_sources(source)?;
    if sources.is_empty() {
        anyhow::bail!("No schemas found in {}", source.display());
    }

    let package = loader::compile_sources(&sources, &config.generation)
        .with_context(|| format!("Failed to compile schemas in {}", source.display()))?;
    let checksum = loader::sources_checksum(&sources);
    let output = codegen::generate_rust(&package, &config.render, Some(&checksum))
        .with_context(|| format!("Failed to render schemas in {}", source.display()))?;
    Ok(output)
}

fn generate(config: &TypegenConfig, source: &Path, output: Option<PathBuf>, dry_run: bool) -> anyhow::Result<()> {
    let generated = render(config, source)?;
    if dry_run {
        print!("{}", generated.code);
        return Ok(());
    }

    let directory = output.unwrap_or_else(|| config.output.directory.clone());
    fs::create_dir_all(&directory).with_context(|| format!("Failed to create {}", directory.display()))?;
    let path = directory.join(config.output_file_name());
    fs::write(&path, &generated.code).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} types to {}", generated.type_count, path.display());
    println!("Generated {} types into {}", generated.type_count, path.display());
    Ok(())
}

fn check(config: &TypegenConfig, source: &Path, against: &Path) -> anyhow::Result<()> {
    let generated = render(config, source)?;
    let existing = fs::read_to_string(against).with_context(|| format!("Failed to read {}", against.display()))?;

    if existing == generated.code {
        println!("{} is up to date ({} types)", against.display(), generated.type_count);
        return Ok(());
    }

    match (Checksum::from_generated(&existing), Checksum::from_generated(&generated.code)) {
        (Some(old), Some(new)) if old == new => {
            println!("Schemas are unchanged; the difference comes from configuration or the generator")
        }
        (Some(_), Some(_)) => println!("Schemas changed since {} was generated", against.display()),
        _ => println!("{} carries no source checksum", against.display()),
    }

    let diff = TextDiff::from_lines(&existing, &generated.code);
    print!(
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header(&against.display().to_string(), "regenerated")
    );

    anyhow::bail!("{} is out of date", against.display())
}

fn model(config: &TypegenConfig, source: &Path) -> anyhow::Result<()> {
    let sources = loader::load_sources(source)?;
    let package = loader::compile_sources(&sources, &config.generation)
        .with_context(|| format!("Failed to compile schemas in {}", source.display()))?;
    println!("{}", serde_json::to_string_pretty(&package)?);
    Ok(())
}
