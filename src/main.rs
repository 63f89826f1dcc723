//! typelens CLI
//!
//! Analyzes type signatures through the shared caches and reports cache
//! statistics.
//!
//! ```text
//! typelens analyze "{ a: string; b?: number[] }" --base-path opts
//! typelens batch signatures.txt --format prometheus
//! ```

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use typelens::cache::{CacheCoordinator, CacheOptions, Preset};
use typelens::config::load_options;
use typelens::types::TypeNode;

// =============================================================================
// CLI Arguments
// =============================================================================

/// typelens - type signature analysis for documentation tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache size preset
    #[arg(long, env = "TYPELENS_PRESET", value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Cache options file (.json, .yaml, .yml); overrides the preset
    #[arg(long, env = "TYPELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more signatures and print their trees
    Analyze {
        /// Signatures to analyze
        #[arg(required = true)]
        signatures: Vec<String>,

        /// Path prefix for description lookups
        #[arg(long, default_value = "")]
        base_path: String,

        /// JSON file mapping property paths to descriptions
        #[arg(long)]
        descriptions: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Analyze one signature per line from a file ("-" for stdin) and report cache statistics
    Batch {
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    /// Prometheus text exposition (statistics only)
    Prometheus,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let options = resolve_options(&args)?;
    let coordinator = CacheCoordinator::configure(options)?;
    info!(preset = %args.preset, "Starting typelens");

    match args.command {
        Command::Analyze {
            signatures,
            base_path,
            descriptions,
            format,
        } => {
            let lookup = match descriptions {
                Some(path) => load_descriptions(&path)?,
                None => BTreeMap::new(),
            };

            let trees: Vec<TypeNode> = signatures
                .iter()
                .map(|signature| {
                    coordinator
                        .type_analysis()
                        .analyze_enriched(signature, &base_path, &lookup)
                })
                .collect();

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&trees)?);
                }
                OutputFormat::Text => {
                    for (signature, tree) in signatures.iter().zip(&trees) {
                        println!("{} => {} ({})", signature.trim(), tree, tree.kind());
                        print_properties(tree, 1);
                    }
                }
                OutputFormat::Prometheus => {
                    anyhow::bail!("prometheus output is only available for batch statistics")
                }
            }
        }

        Command::Batch { input, format } => {
            let reader = open_input(&input)?;
            let mut analyzed = 0usize;
            let mut unknown = 0usize;

            for line in reader.lines() {
                let line = line.context("Failed to read signature")?;
                if line.trim().is_empty() {
                    continue;
                }
                if coordinator.type_analysis().get_or_compute(&line).is_unknown() {
                    unknown += 1;
                }
                analyzed += 1;
            }
            debug!(analyzed, unknown, "Batch complete");

            let stats = coordinator.aggregated_stats();
            match format {
                OutputFormat::Json => {
                    let mut report = stats.to_json();
                    report["analyzed"] = analyzed.into();
                    report["unknown"] = unknown.into();
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Prometheus => print!("{}", stats.to_prometheus_text()?),
                OutputFormat::Text => {
                    println!("Analyzed {} signatures ({} unknown)", analyzed, unknown);
                    for (name, cache) in &stats.caches {
                        println!(
                            "  {:<14} {}/{} entries, {} hits, {} misses, {} evictions, hit rate {:.1}%",
                            name,
                            cache.size,
                            cache.max_size,
                            cache.hit_count,
                            cache.miss_count,
                            cache.eviction_count,
                            cache.hit_rate() * 100.0
                        );
                    }
                    println!("  combined hit rate {:.1}%", stats.combined_hit_rate() * 100.0);
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_options(args: &Args) -> anyhow::Result<CacheOptions> {
    match &args.config {
        Some(path) => load_options(path)
            .with_context(|| format!("Failed to load cache options from {}", path.display())),
        None => Ok(args.preset.options()),
    }
}

fn load_descriptions(path: &PathBuf) -> anyhow::Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptions from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Descriptions in {} must be a JSON object of strings", path.display()))
}

fn open_input(path: &PathBuf) -> anyhow::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(Box::new(io::Cursor::new(text)));
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn print_properties(node: &TypeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    for property in node.properties() {
        let marker = if property.optional { "?" } else { "" };
        match &property.description {
            Some(description) => println!(
                "{}{}{}: {}  // {}",
                indent, property.name, marker, property.type_node, description
            ),
            None => println!("{}{}{}: {}", indent, property.name, marker, property.type_node),
        }
        print_properties(&property.type_node, depth + 1);
    }
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout stays machine-readable
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}
