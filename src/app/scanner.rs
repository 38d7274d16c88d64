use crate::app::error::{AutoloadError, BoxError, Result};
use crate::app::loader::ModuleLoader;
use crate::app::models::{LoadConfig, LoadErrorPolicy, LoadFailure, LoadResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Walks a directory tree and loads every file the loader recognizes.
///
/// Each call to [`TreeLoader::load`] is independent: results are built from
/// scratch and nothing is kept between calls (unless the loader itself caches).
pub struct TreeLoader<L> {
    loader: L,
}

impl<L: ModuleLoader> TreeLoader<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Scans `config.path` depth-first and assembles the tree and namespace list.
    ///
    /// # Errors
    ///
    /// Fails before walking if the path is missing, not a directory, or not
    /// readable. During the walk, listing errors and (under
    /// [`LoadErrorPolicy::Abort`]) loader errors abort the whole scan.
    ///
    /// With `include_tree` set, two entries that map to the same tree key fail
    /// with [`AutoloadError::TreeConflict`]: a file stem next to a directory of
    /// the same name (`routes.toml` and `routes/`), two files whose names differ
    /// only in extension case (`foo.toml` and `foo.TOML`), or an extra module
    /// named like a scanned root-level entry. Without `include_tree` nothing is
    /// inserted and these inputs load normally.
    pub fn load(&self, config: &LoadConfig) -> Result<LoadResult<L::Value>> {
        let root = resolve_root(config)?;
        let skips = Arc::new(SkipList::new(&config.files_to_skip, &config.skip_patterns)?);
        let extension = config
            .extension
            .as_deref()
            .unwrap_or_else(|| self.loader.extension())
            .trim_start_matches('.')
            .to_string();

        let mut result = LoadResult::default();
        for entry in build_walker(&root, config, skips) {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }

            // Directories are descended by the walker; anything that is not a
            // regular file (symlinks, sockets) is never loaded.
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if !is_file || !has_extension(entry.path(), &extension) {
                continue;
            }

            if let Some(segments) = namespace_segments(&root, entry.path(), true) {
                self.include(config, &mut result, entry.path(), segments)?;
            }
        }

        self.include_modules(config, &root, &mut result)?;
        Ok(result)
    }

    fn include(
        &self,
        config: &LoadConfig,
        result: &mut LoadResult<L::Value>,
        path: &Path,
        mut segments: Vec<String>,
    ) -> Result<()> {
        let namespace = segments.join(".");
        log::debug!("Including file {} as '{}'", path.display(), namespace);

        let value = match self.loader.load(path, &namespace) {
            Ok(value) => value,
            Err(source) => return record_failure(config, result, namespace, path, source),
        };

        if config.include_tree {
            // segments is never empty for an entry below the root; a stem
            // already present at this level is a TreeConflict, never an overwrite
            if let Some(key) = segments.pop() {
                result.tree.insert(&segments, key, value)?;
            }
        }
        if config.include_namespaces {
            result.namespaces.push(namespace);
        }
        Ok(())
    }

    fn include_modules(
        &self,
        config: &LoadConfig,
        root: &Path,
        result: &mut LoadResult<L::Value>,
    ) -> Result<()> {
        for (name, path) in &config.modules {
            let path = if path.is_relative() {
                root.join(path)
            } else {
                path.clone()
            };
            log::debug!("Including module '{}' from {}", name, path.display());

            match self.loader.load(&path, name) {
                Ok(value) if config.include_tree => result.tree.insert(&[], name.clone(), value)?,
                Ok(_) => {}
                Err(source) => record_failure(config, result, name.clone(), &path, source)?,
            }
        }
        Ok(())
    }
}

fn record_failure<T>(
    config: &LoadConfig,
    result: &mut LoadResult<T>,
    namespace: String,
    path: &Path,
    source: BoxError,
) -> Result<()> {
    match config.on_load_error {
        LoadErrorPolicy::Abort => Err(AutoloadError::load(namespace, path, source)),
        LoadErrorPolicy::Collect => {
            log::warn!("Error loading '{}' ({}): {}", namespace, path.display(), source);
            result
                .failures
                .push(LoadFailure::new(&namespace, path, &*source));
            Ok(())
        }
    }
}

/// Validates the configured root and normalizes it lexically.
fn resolve_root(config: &LoadConfig) -> Result<PathBuf> {
    let path = match &config.path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(AutoloadError::MissingPath),
    };
    let root: PathBuf = path.components().collect();
    if !root.is_dir() || fs::read_dir(&root).is_err() {
        return Err(AutoloadError::PathNotFound { path: root });
    }
    Ok(root)
}

fn build_walker(root: &Path, config: &LoadConfig, skips: Arc<SkipList>) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .git_ignore(config.respect_gitignore)
        .require_git(false)
        .follow_links(config.follow_links);

    if config.sort_entries {
        builder.sort_by_file_name(|a, b| a.cmp(b));
    }

    // Pruning here keeps the walker out of skipped directories entirely.
    let filter_root = root.to_path_buf();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        let Some(segments) = namespace_segments(&filter_root, entry.path(), !is_dir) else {
            return true;
        };
        if segments.is_empty() {
            return true;
        }
        let namespace = segments.join(".");
        if skips.is_skipped(&namespace) {
            log::debug!("Skipping '{}'", namespace);
            return false;
        }
        true
    });

    builder.build()
}

/// Path segments from `root` to `path`, with the extension dropped from the
/// last segment when `is_file` is set.
///
/// `root/routes/baz/bar.toml` yields `["routes", "baz", "bar"]`.
pub fn namespace_segments(root: &Path, path: &Path, is_file: bool) -> Option<Vec<String>> {
    let relative = diff_paths(path, root)?;
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if is_file {
        if let (Some(last), Some(stem)) = (segments.last_mut(), relative.file_stem()) {
            *last = stem.to_string_lossy().into_owned();
        }
    }
    Some(segments)
}

/// Dotted namespace of `path` relative to `root`, e.g. `routes.baz.bar`.
pub fn namespace_for(root: &Path, path: &Path, is_file: bool) -> Option<String> {
    namespace_segments(root, path, is_file).map(|segments| segments.join("."))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| !ext.is_empty() && ext.eq_ignore_ascii_case(extension))
}

/// Exact namespaces plus glob patterns that exclude entries from the scan.
#[derive(Debug)]
struct SkipList {
    exact: HashSet<String>,
    patterns: GlobSet,
}

impl SkipList {
    fn new(exact: &[String], patterns: &[String]) -> Result<Self> {
        Ok(Self {
            exact: exact.iter().cloned().collect(),
            patterns: build_globset(patterns)?,
        })
    }

    fn is_skipped(&self, namespace: &str) -> bool {
        self.exact.contains(namespace) || self.patterns.is_match(namespace)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| AutoloadError::InvalidPattern {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| AutoloadError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}
