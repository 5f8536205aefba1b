use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemaport_core::{
    Config, DatabaseType, Diagram, ExportReport, FeatureCategory, UnsupportedFeature,
};
use schemaport_engine::{
    detect_unsupported_features, export_cross_dialect, export_stats, get_supported_target_dialects,
    has_cross_dialect_support, ExportRequest,
};

const DEFAULT_CONFIG: &str = "schemaport.toml";

/// schemaport - deterministic cross-dialect DDL export
#[derive(Parser)]
#[command(name = "schemaport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemaport.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a diagram as DDL for another dialect
    Export {
        /// Diagram JSON file
        diagram: PathBuf,

        /// Target dialect (mysql, mariadb, sqlserver)
        #[arg(short, long)]
        target: Option<String>,

        /// Write DDL here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit only foreign-key statements
        #[arg(long)]
        only_relationships: bool,

        /// Also write a JSON export report
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List features that will not convert 1:1
    Check {
        /// Diagram JSON file
        diagram: PathBuf,

        /// Target dialect (mysql, mariadb, sqlserver)
        #[arg(short, long)]
        target: Option<String>,

        /// Print the features as JSON
        #[arg(long)]
        json: bool,
    },

    /// List targets with a deterministic exporter
    Targets {
        /// Source dialect
        #[arg(default_value = "postgresql")]
        source: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    tracing::debug!(
        target_dialect = %config.target,
        strict = config.strict,
        "configuration loaded"
    );

    match cli.command {
        Commands::Export { diagram, target, output, only_relationships, report } => {
            export_command(
                &config,
                &diagram,
                target.as_deref(),
                output.as_deref(),
                only_relationships,
                report.as_deref(),
                cli.verbose,
            )
        }
        Commands::Check { diagram, target, json } => {
            check_command(&config, &diagram, target.as_deref(), json)
        }
        Commands::Targets { source } => targets_command(&source),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit config path, else `schemaport.toml` when present, else defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::from_file(path)?);
    }

    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        return Ok(Config::from_file(default_path)?);
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Target from the command line, falling back to the config
fn resolve_target(arg: Option<&str>, config: &Config) -> Result<DatabaseType> {
    match arg {
        Some(name) => name.parse::<DatabaseType>().map_err(|e| anyhow!("{}", e)),
        None => Ok(config.target),
    }
}

fn load_diagram(path: &Path) -> Result<Diagram> {
    Diagram::from_file(path).map_err(|e| anyhow!("Failed to load diagram: {}", e))
}

fn ensure_supported(source: DatabaseType, target: DatabaseType) -> Result<()> {
    if has_cross_dialect_support(source, target) {
        return Ok(());
    }

    let supported: Vec<&str> =
        get_supported_target_dialects(source).iter().map(|t| t.as_str()).collect();
    Err(anyhow!(
        "No deterministic exporter from {} to {}{}",
        source.label(),
        target.label(),
        if supported.is_empty() {
            String::new()
        } else {
            format!(" (supported targets: {})", supported.join(", "))
        }
    ))
}

/// Export command - write DDL and optionally a report
fn export_command(
    config: &Config,
    diagram_path: &Path,
    target: Option<&str>,
    output: Option<&Path>,
    only_relationships: bool,
    report_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let target = resolve_target(target, config)?;
    let diagram = load_diagram(diagram_path)?;
    ensure_supported(diagram.database_type, target)?;

    let request = ExportRequest::new(&diagram)
        .with_only_relationships(only_relationships || config.only_relationships);

    if verbose {
        eprintln!(
            "{} {} → {}",
            "Exporting".cyan(),
            diagram.database_type.label(),
            target.label()
        );
    }

    let ddl = export_cross_dialect(&request, target)
        .ok_or_else(|| anyhow!("No exporter produced output for {}", target.label()))?;

    match output {
        Some(path) => {
            std::fs::write(path, &ddl)?;
            if verbose {
                eprintln!("{} {}", "DDL written to:".green(), path.display());
            }
        }
        None => print!("{}", ddl),
    }

    if let Some(path) = report_path {
        let features = detect_unsupported_features(&diagram, target);
        let report = ExportReport::new(diagram.database_type, target, features)
            .with_stats(export_stats(&request))
            .with_output(&ddl);
        report.save_to_file(path)?;

        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    Ok(())
}

/// Check command - list degraded features, failing in strict mode
fn check_command(
    config: &Config,
    diagram_path: &Path,
    target: Option<&str>,
    json: bool,
) -> Result<()> {
    let target = resolve_target(target, config)?;
    let diagram = load_diagram(diagram_path)?;
    ensure_supported(diagram.database_type, target)?;

    let features = detect_unsupported_features(&diagram, target);
    let unacknowledged = config.allowlist.unacknowledged(&features);

    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        print_features(&features, config, diagram.database_type, target);
    }

    if config.strict && !unacknowledged.is_empty() {
        eprintln!(
            "{} {} unacknowledged feature(s) in strict mode",
            "error:".red().bold(),
            unacknowledged.len()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn print_features(
    features: &[UnsupportedFeature],
    config: &Config,
    source: DatabaseType,
    target: DatabaseType,
) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!(
        "{}",
        format!("{} → {} conversion check", source.label(), target.label()).bold().bright_blue()
    );
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if features.is_empty() {
        println!("{}", "✓ Everything converts 1:1".green().bold());
        return;
    }

    println!("{}", "Summary:".bold());
    println!("  Total features: {}", features.len());
    for category in FeatureCategory::ALL {
        let count = features.iter().filter(|f| f.category == category).count();
        if count > 0 {
            println!("  {:<18} {}", format!("{}:", category.title()), count.to_string().yellow());
        }
    }
    println!();

    for category in FeatureCategory::ALL {
        let group: Vec<&UnsupportedFeature> =
            features.iter().filter(|f| f.category == category).collect();
        if group.is_empty() {
            continue;
        }

        println!("{} [{}]", category.title().bold(), category.as_str().dimmed());
        for feature in group {
            let marker = if config.allowlist.is_acknowledged(feature) {
                "ACK".green()
            } else {
                "WARN".yellow().bold()
            };
            println!("  [{}] {}: {}", marker, feature.location().cyan(), feature.feature);
            println!("    {} {}", "→".dimmed(), feature.recommendation);
        }
        println!();
    }
}

/// Targets command - print the routing table for one source
fn targets_command(source: &str) -> Result<()> {
    let source = source.parse::<DatabaseType>().map_err(|e| anyhow!("{}", e))?;
    let targets = get_supported_target_dialects(source);

    if targets.is_empty() {
        println!("{} {}", "No deterministic targets for".yellow(), source.label());
        return Ok(());
    }

    println!("{} {}:", "Deterministic targets for".bold(), source.label());
    for target in targets {
        println!("  {:<10} {}", target.as_str().green(), target.label());
    }
    Ok(())
}
