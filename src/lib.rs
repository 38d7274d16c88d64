//! Recursively loads every module under a directory into a nested tree keyed
//! by directory and file names, and lists the dotted namespace of each one.
//!
//! ```no_run
//! use tree_autoload::{LoadConfig, TomlLoader, TreeLoader};
//!
//! let config = LoadConfig::new("config").skip("routes.legacy").tree(true).namespaces(true);
//! let result = TreeLoader::new(TomlLoader).load(&config)?;
//! for namespace in &result.namespaces {
//!     println!("{namespace}");
//! }
//! # Ok::<(), tree_autoload::AutoloadError>(())
//! ```

pub mod app;

pub use app::error::{AutoloadError, BoxError, Result};
pub use app::loader::{
    builtin_loader, CachingLoader, JsonLoader, ModuleLoader, Registry, TextLoader, TomlLoader,
};
pub use app::models::{LoadConfig, LoadErrorPolicy, LoadFailure, LoadResult};
pub use app::scanner::{namespace_for, TreeLoader};
pub use app::tree::{Node, Tree};
