// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod models;
pub mod scanner;
pub mod tree;

use anyhow::{Context, Result};
use clap::Parser;

use self::cli::{Cli, OutputFormat};
use self::config::resolve_config;
use self::formatter::OutputGenerator;
use self::loader::builtin_loader;
use self::scanner::TreeLoader;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Resolve Configuration
    let config = resolve_config(args)?;

    if !config.load.include_tree && !config.load.include_namespaces {
        log::warn!("Neither --tree nor --namespaces given; the result will be empty.");
    }

    // 3. Scan Directory
    let extension = config.load.extension.as_deref().unwrap_or("toml");
    let loader = TreeLoader::new(builtin_loader(extension));
    let result = loader
        .load(&config.load)
        .context("Failed to autoload directory")?;

    for failure in &result.failures {
        log::warn!("Skipped '{}': {}", failure.namespace, failure.message);
    }

    // 4. Generate Output
    let final_output = match config.format {
        OutputFormat::Json => OutputGenerator::generate_json(&result)?,
        OutputFormat::Text => OutputGenerator::format_full_output(&result),
    };

    // 5. Print to Stdout
    println!("{}", final_output);

    Ok(())
}
