use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::ConfigCommands;

pub fn handle_config_command(command: ConfigCommands, config_path: Option<&PathBuf>) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => {
            let path = config_path
                .cloned()
                .unwrap_or_else(Config::default_config_path);

            if path.exists() && !force {
                println!("⚠️  Config file already exists at: {}", path.display());
                println!("   Use --force to overwrite");
                return Ok(());
            }

            let default_config = Config::default();
            default_config.save(&path)?;
            println!("✅ Created config file at: {}", path.display());

            println!("\nSample configuration:");
            println!("{}", serde_json::to_string_pretty(&default_config)?);
        }
        ConfigCommands::Show { json } => {
            let config = Config::load(config_path)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("db-embed Configuration");
                println!("======================");
                println!();
                println!("Version: {}", config.version);
                println!();
                println!("Paths:");
                println!("  Source: {}", config.paths.source);
                println!("  Output: {}", config.paths.output);
                println!();
                println!("Artifact:");
                println!("  Global Name: {}", config.artifact.global_name);
                println!("  Loader Name: {}", config.artifact.loader_name);
                println!("  Asset Label: {}", config.artifact.asset_label);
            }
        }
        ConfigCommands::Validate => {
            let path = config_path
                .cloned()
                .unwrap_or_else(Config::default_config_path);

            println!("🔍 Validating config file at: {}", path.display());

            match Config::load(Some(&path)) {
                Ok(config) => {
                    println!("✅ Config file is valid!");
                    println!();
                    println!("Resolved paths:");
                    println!("  Source: {}", config.source_path().display());
                    println!("  Output: {}", config.output_path().display());
                }
                Err(e) => {
                    println!("❌ Config file validation failed:");
                    println!("   {e:#}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
