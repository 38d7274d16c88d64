use crate::app::cli::Cli;
use crate::app::models::{LoadConfig, LoadErrorPolicy, RuntimeConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PresetConfig {
    pub files_to_skip: Option<Vec<String>>,
    pub skip_patterns: Option<Vec<String>>,
    pub extension: Option<String>,
    pub sort_entries: Option<bool>,
    pub modules: Option<HashMap<String, PathBuf>>,
}

fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("tree_autoload")
        .join("presets.toml"))
}

fn load_presets_file() -> Result<HashMap<String, PresetConfig>> {
    let config_path = presets_path()?;

    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_presets(&content)
}

pub fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

pub fn resolve_config(cli: Cli) -> Result<RuntimeConfig> {
    let presets = load_presets_file()?;
    Ok(merge_config(cli, &presets))
}

/// Combines CLI args with the preset chosen by `--preset`, or else by the
/// name of the directory being loaded.
pub fn merge_config(cli: Cli, presets: &HashMap<String, PresetConfig>) -> RuntimeConfig {
    let dir_name = cli
        .path
        .as_deref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());
    let preset_key = cli.preset.as_deref().or(dir_name);
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();

    let load = LoadConfig {
        path: cli.path,
        files_to_skip: merge_vecs(preset.files_to_skip, cli.skip),
        skip_patterns: merge_vecs(preset.skip_patterns, cli.skip_pattern),
        include_namespaces: cli.namespaces,
        include_tree: cli.tree,
        sort_entries: cli.sort || preset.sort_entries.unwrap_or(false),
        respect_gitignore: cli.gitignore,
        follow_links: false,
        extension: cli.ext.or(preset.extension),
        on_load_error: if cli.keep_going {
            LoadErrorPolicy::Collect
        } else {
            LoadErrorPolicy::Abort
        },
        modules: preset.modules.unwrap_or_default().into_iter().collect(),
    };

    RuntimeConfig {
        load,
        format: cli.format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const PRESETS: &str = r#"
[app]
files_to_skip = ["routes.skipMe"]
extension = "json"
sort_entries = true

[other]
skip_patterns = ["*.draft"]

[other.modules]
settings = "../settings.toml"
"#;

    #[test]
    fn preset_is_detected_from_directory_name() {
        let presets = parse_presets(PRESETS).unwrap();
        let cli = Cli::parse_from(["tree-autoload", "/srv/app", "--skip", "controllers.old", "--tree"]);
        let config = merge_config(cli, &presets).load;

        assert_eq!(config.files_to_skip, vec!["routes.skipMe", "controllers.old"]);
        assert_eq!(config.extension.as_deref(), Some("json"));
        assert!(config.sort_entries);
        assert!(config.include_tree);
        assert!(!config.include_namespaces);
        assert_eq!(config.on_load_error, LoadErrorPolicy::Abort);
    }

    #[test]
    fn explicit_preset_and_cli_values_win() {
        let presets = parse_presets(PRESETS).unwrap();
        let cli = Cli::parse_from([
            "tree-autoload",
            "/srv/app",
            "--preset",
            "other",
            "--ext",
            "toml",
            "--skip-pattern",
            "*.draft",
            "--keep-going",
        ]);
        let config = merge_config(cli, &presets).load;

        assert!(config.files_to_skip.is_empty());
        assert_eq!(config.skip_patterns, vec!["*.draft"]);
        assert_eq!(config.extension.as_deref(), Some("toml"));
        assert_eq!(config.modules.get("settings"), Some(&PathBuf::from("../settings.toml")));
        assert_eq!(config.on_load_error, LoadErrorPolicy::Collect);
    }

    #[test]
    fn missing_path_is_left_for_the_loader_to_reject() {
        let cli = Cli::parse_from(["tree-autoload", "--namespaces"]);
        let config = merge_config(cli, &HashMap::new()).load;
        assert!(config.path.is_none());
        assert!(config.include_namespaces);
    }
}
