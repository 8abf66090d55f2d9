use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod assets;
mod config;
mod handle_config;
mod packager;
mod template;

use config::Config;
use handle_config::handle_config_command;
use packager::{PackageOutcome, VerifyOutcome};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the effective configuration
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a config file
    Validate,
}

#[derive(Parser)]
#[command(name = "db-embed")]
#[command(about = "Embed a binary database as base64 in a generated JavaScript loader")]
struct Cli {
    /// Path to a JSON config file (defaults to ./db-embed.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the source database into a JavaScript artifact (the default)
    Package {
        /// Binary file to embed
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        /// Generated JavaScript file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Check that an artifact's payload decodes back to the source file
    Verify {
        /// Binary file the artifact was generated from
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,
        /// Generated JavaScript file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run_package(
    config: &Config,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let source = source.unwrap_or_else(|| config.source_path());
    let output = output.unwrap_or_else(|| config.output_path());

    let outcome = packager::package(&source, &output, &config.artifact)?;
    if let PackageOutcome::Written(report) = &outcome {
        tracing::info!(
            source = %report.source.display(),
            output = %report.output.display(),
            bytes = report.source_len,
            encoded = report.encoded_len,
            sha256 = %report.sha256,
            "packaged asset"
        );
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_verify(
    config: &Config,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let source = source.unwrap_or_else(|| config.source_path());
    let output = output.unwrap_or_else(|| config.output_path());

    let outcome = packager::verify(&source, &output, &config.artifact)?;
    match &outcome {
        VerifyOutcome::Match { bytes, sha256 } => {
            println!("✅ {} matches {}", output.display(), source.display());
            println!("   {} bytes, sha256:{}", template::group_thousands(*bytes), sha256);
        }
        VerifyOutcome::Mismatch { expected, actual } => {
            eprintln!("❌ {} is out of date with {}", output.display(), source.display());
            eprintln!("   source  sha256:{expected}");
            eprintln!("   payload sha256:{actual}");
        }
        VerifyOutcome::SourceMissing(path) | VerifyOutcome::ArtifactMissing(path) => {
            eprintln!("❌ Error: {} not found", path.display());
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Some(Commands::Config { command }) => {
            handle_config_command(command, cli.config_path.as_ref())?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Verify { source, output }) => {
            let config = Config::load(cli.config_path.as_ref())?;
            run_verify(&config, source, output)
        }
        Some(Commands::Package { source, output }) => {
            let config = Config::load(cli.config_path.as_ref())?;
            run_package(&config, source, output)
        }
        None => {
            // Default behavior: package with the configured paths
            let config = Config::load(cli.config_path.as_ref())?;
            run_package(&config, None, None)
        }
    }
}
