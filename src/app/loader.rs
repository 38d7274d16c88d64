//! The load capability: turning a discovered file into a value.
//!
//! The scanner never interprets file contents itself. It hands each loadable
//! path to a [`ModuleLoader`], which decides what "loading" means: parsing a
//! data file, looking a factory up in a [`Registry`], or anything else.

use crate::app::error::BoxError;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads the artifact at a path and returns the value it exports.
pub trait ModuleLoader {
    type Value;

    /// Extension (without the leading dot) of the files this loader accepts.
    fn extension(&self) -> &str;

    /// Loads `path`, whose derived namespace is `namespace`.
    ///
    /// # Errors
    ///
    /// Any error returned here is reported against the file's namespace.
    fn load(&self, path: &Path, namespace: &str) -> Result<Self::Value, BoxError>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    type Value = L::Value;

    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn load(&self, path: &Path, namespace: &str) -> Result<Self::Value, BoxError> {
        (**self).load(path, namespace)
    }
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Box<L> {
    type Value = L::Value;

    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn load(&self, path: &Path, namespace: &str) -> Result<Self::Value, BoxError> {
        (**self).load(path, namespace)
    }
}

/// Parses `.toml` files into JSON values.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlLoader;

impl ModuleLoader for TomlLoader {
    type Value = Value;

    fn extension(&self) -> &str {
        "toml"
    }

    fn load(&self, path: &Path, _namespace: &str) -> Result<Value, BoxError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Parses `.json` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl ModuleLoader for JsonLoader {
    type Value = Value;

    fn extension(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path, _namespace: &str) -> Result<Value, BoxError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Exports the raw file contents as a string.
#[derive(Debug, Clone)]
pub struct TextLoader {
    extension: String,
}

impl TextLoader {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl ModuleLoader for TextLoader {
    type Value = Value;

    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, path: &Path, _namespace: &str) -> Result<Value, BoxError> {
        Ok(Value::String(fs::read_to_string(path)?))
    }
}

/// Picks the built-in loader for an extension: TOML, JSON, or plain text.
pub fn builtin_loader(extension: &str) -> Box<dyn ModuleLoader<Value = Value>> {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "toml" => Box::new(TomlLoader),
        "json" => Box::new(JsonLoader),
        other => Box::new(TextLoader::new(other)),
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Modules registered ahead of time, keyed by namespace.
///
/// The file found on disk only marks the module as present; its value comes
/// from the factory registered under the same namespace.
pub struct Registry<T> {
    extension: String,
    factories: HashMap<String, Factory<T>>,
}

impl<T> Registry<T> {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, namespace: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(namespace.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.factories.contains_key(namespace)
    }
}

impl<T> ModuleLoader for Registry<T> {
    type Value = T;

    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, _path: &Path, namespace: &str) -> Result<T, BoxError> {
        let factory = self
            .factories
            .get(namespace)
            .ok_or_else(|| format!("no module registered for namespace '{}'", namespace))?;
        Ok(factory())
    }
}

/// Loads each file at most once, keyed by its canonical path.
///
/// Later requests for the same file return a clone of the first value, across
/// any number of scans sharing this loader.
pub struct CachingLoader<L: ModuleLoader> {
    inner: L,
    cache: RefCell<HashMap<PathBuf, L::Value>>,
}

impl<L> CachingLoader<L>
where
    L: ModuleLoader,
    L::Value: Clone,
{
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L> ModuleLoader for CachingLoader<L>
where
    L: ModuleLoader,
    L::Value: Clone,
{
    type Value = L::Value;

    fn extension(&self) -> &str {
        self.inner.extension()
    }

    fn load(&self, path: &Path, namespace: &str) -> Result<L::Value, BoxError> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(value) = self.cache.borrow().get(&key) {
            return Ok(value.clone());
        }
        let value = self.inner.load(path, namespace)?;
        self.cache.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn toml_loader_parses_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.toml");
        fs::write(&path, "host = \"localhost\"\nport = 5432\n").unwrap();

        let value = TomlLoader.load(&path, "db").unwrap();
        assert_eq!(value, json!({"host": "localhost", "port": 5432}));
    }

    #[test]
    fn json_loader_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonLoader.load(&path, "broken").is_err());
    }

    #[test]
    fn builtin_loader_falls_back_to_text() {
        assert_eq!(builtin_loader("TOML").extension(), "toml");
        assert_eq!(builtin_loader(".json").extension(), "json");
        assert_eq!(builtin_loader("sql").extension(), "sql");
    }

    #[test]
    fn registry_resolves_by_namespace() {
        let mut registry = Registry::new("rs");
        registry.register("controllers.foo", || 42);

        assert!(registry.contains("controllers.foo"));
        assert_eq!(registry.load(Path::new("ignored"), "controllers.foo").unwrap(), 42);
        let err = registry.load(Path::new("ignored"), "controllers.bar").unwrap_err();
        assert!(err.to_string().contains("controllers.bar"));
    }

    struct Counting<'a> {
        calls: &'a Cell<usize>,
    }

    impl ModuleLoader for Counting<'_> {
        type Value = usize;

        fn extension(&self) -> &str {
            "txt"
        }

        fn load(&self, _path: &Path, _namespace: &str) -> Result<usize, BoxError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.calls.get())
        }
    }

    #[test]
    fn caching_loader_loads_each_path_once() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();

        let calls = Cell::new(0);
        let loader = CachingLoader::new(Counting { calls: &calls });
        assert_eq!(loader.load(&a, "a").unwrap(), 1);
        assert_eq!(loader.load(&a, "a").unwrap(), 1);
        assert_eq!(loader.load(&b, "b").unwrap(), 2);
        assert_eq!(calls.get(), 2);
        assert_eq!(loader.cached(), 2);

        loader.clear();
        assert_eq!(loader.load(&a, "a").unwrap(), 3);
    }
}
