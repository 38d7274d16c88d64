use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by a [`ModuleLoader`](crate::app::loader::ModuleLoader).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using AutoloadError.
pub type Result<T> = std::result::Result<T, AutoloadError>;

/// Errors that can occur while autoloading a directory tree.
#[derive(Error, Debug)]
pub enum AutoloadError {
    /// No root path was configured.
    #[error("missing required path: provide the directory to autoload")]
    MissingPath,

    /// The root path does not exist or is not a directory.
    #[error("directory '{}' does not exist", path.display())]
    PathNotFound { path: PathBuf },

    /// The loader failed on a discovered file.
    #[error("failed to load '{namespace}' from '{}': {source}", path.display())]
    Load {
        namespace: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Listing a directory or inspecting an entry failed mid-walk.
    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    /// Two modules, or a module and a directory, share a key at the same tree level.
    #[error("'{namespace}' is claimed by more than one module or directory")]
    TreeConflict { namespace: String },

    /// A skip pattern is not a valid glob.
    #[error("invalid skip pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl AutoloadError {
    pub fn load(namespace: impl Into<String>, path: impl Into<PathBuf>, source: BoxError) -> Self {
        Self::Load {
            namespace: namespace.into(),
            path: path.into(),
            source,
        }
    }
}
