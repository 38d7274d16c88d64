use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load every module under a directory into a nested tree"
)]
pub struct Cli {
    /// Directory to autoload
    pub path: Option<PathBuf>,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Namespaces to skip (e.g., 'routes.foo'); a skipped directory is not entered
    #[arg(long, num_args = 1..)]
    pub skip: Option<Vec<String>>,

    /// Glob patterns matched against namespaces to skip (e.g., '*.draft')
    #[arg(long, num_args = 1..)]
    pub skip_pattern: Option<Vec<String>>,

    /// Report the namespace of every loaded file
    #[arg(long)]
    pub namespaces: bool,

    /// Report loaded values as a nested tree
    #[arg(long)]
    pub tree: bool,

    /// Visit entries in file name order
    #[arg(long)]
    pub sort: bool,

    /// Extension of the files to load (toml, json, or anything read as text)
    #[arg(long)]
    pub ext: Option<String>,

    /// Record files that fail to load instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Honour .gitignore files under the directory
    #[arg(long)]
    pub gitignore: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}
