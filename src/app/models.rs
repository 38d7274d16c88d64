use crate::app::cli::OutputFormat;
use crate::app::tree::Tree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What to do when the loader fails on a discovered file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorPolicy {
    /// Stop the scan and return the error.
    #[default]
    Abort,
    /// Log the failure, record it in [`LoadResult::failures`], keep going.
    Collect,
}

/// Settings for one autoload pass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Root directory to scan.
    pub path: Option<PathBuf>,
    /// Namespaces excluded from loading. A skipped directory is not entered.
    #[serde(alias = "filesToSkip")]
    pub files_to_skip: Vec<String>,
    /// Glob patterns matched against namespaces, with the same effect as `files_to_skip`.
    pub skip_patterns: Vec<String>,
    /// Report the namespace of every loaded file.
    #[serde(alias = "getNamespaces")]
    pub include_namespaces: bool,
    /// Report loaded values as a nested tree.
    #[serde(alias = "getAsObject")]
    pub include_tree: bool,
    /// Visit directory entries sorted by file name instead of listing order.
    pub sort_entries: bool,
    /// Honour `.gitignore` files found under the root.
    pub respect_gitignore: bool,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Overrides the loader's extension.
    pub extension: Option<String>,
    pub on_load_error: LoadErrorPolicy,
    /// Additional files loaded after the scan and attached at the tree root.
    pub modules: BTreeMap<String, PathBuf>,
}

impl LoadConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn skip(mut self, namespace: impl Into<String>) -> Self {
        self.files_to_skip.push(namespace.into());
        self
    }

    pub fn skip_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.skip_patterns.push(pattern.into());
        self
    }

    pub fn namespaces(mut self, enabled: bool) -> Self {
        self.include_namespaces = enabled;
        self
    }

    pub fn tree(mut self, enabled: bool) -> Self {
        self.include_tree = enabled;
        self
    }

    pub fn sorted(mut self) -> Self {
        self.sort_entries = true;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn on_load_error(mut self, policy: LoadErrorPolicy) -> Self {
        self.on_load_error = policy;
        self
    }

    pub fn module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.modules.insert(name.into(), path.into());
        self
    }
}

/// A file the loader failed on while running under [`LoadErrorPolicy::Collect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub namespace: String,
    pub path: PathBuf,
    pub message: String,
}

impl LoadFailure {
    pub fn new(namespace: &str, path: &Path, error: &dyn std::error::Error) -> Self {
        Self {
            namespace: namespace.to_string(),
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a successful autoload pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadResult<T> {
    /// Loaded values by directory; empty unless `include_tree` was set.
    #[serde(rename = "app")]
    pub tree: Tree<T>,
    /// Namespaces in depth-first order; empty unless `include_namespaces` was set.
    pub namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<LoadFailure>,
}

impl<T> Default for LoadResult<T> {
    fn default() -> Self {
        Self {
            tree: Tree::new(),
            namespaces: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// The final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub load: LoadConfig,
    pub format: OutputFormat,
}
