//! Configuration types deserialized from `geox.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default cache location, relative to the project directory.
pub const DEFAULT_CACHE_PATH: &str = ".geox-cache";

/// Default key-material file name.
pub const DEFAULT_KEY_FILE: &str = "key.key";

/// The top-level project configuration parsed from `geox.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Compute-cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// User parameter values keyed by parameter name.
    ///
    /// Each value is routed to every domain object that declares an input of
    /// that name. An entry may also be written as `{ value = .., comment = ".." }`.
    #[serde(default)]
    pub inputs: BTreeMap<String, toml::Value>,
}

/// Settings for the compute cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Whether cached results are read and written at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Which durable store backs the cache.
    #[serde(default)]
    pub backend: BackendKind,
    /// Directory (file backend) or database file (sqlite backend).
    #[serde(default = "default_path")]
    pub path: String,
    /// Key-material file; derived from `path` when absent.
    #[serde(default)]
    pub key_file: Option<String>,
    /// Name recorded as the principal of stored entries.
    #[serde(default)]
    pub principal: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    DEFAULT_CACHE_PATH.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            backend: BackendKind::default(),
            path: default_path(),
            key_file: None,
            principal: None,
        }
    }
}

/// Durable store behind the cache.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One validated file per entry under a directory (default).
    #[default]
    File,
    /// A single SQLite database file.
    Sqlite,
}

impl CacheConfig {
    /// Resolves the store location against `base`.
    pub fn store_path(&self, base: &Path) -> PathBuf {
        base.join(&self.path)
    }

    /// Resolves the key-material file against `base`.
    ///
    /// Defaults to `key.key` inside the cache directory for the file backend
    /// and next to the database file for the sqlite backend.
    pub fn key_path(&self, base: &Path) -> PathBuf {
        if let Some(key_file) = &self.key_file {
            return base.join(key_file);
        }
        let store = self.store_path(base);
        match self.backend {
            BackendKind::File => store.join(DEFAULT_KEY_FILE),
            BackendKind::Sqlite => store
                .parent()
                .map(|dir| dir.join(DEFAULT_KEY_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE)),
        }
    }

    /// Returns the configured principal, falling back to the login name.
    pub fn resolved_principal(&self) -> String {
        self.principal
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Renders a TOML input value as the text a parameter parses.
///
/// Arrays of numbers become comma-separated lists. A table is accepted only in
/// the `{ value, comment }` form. Other tables, datetimes and nested arrays
/// have no parameter form and yield `None`.
pub fn input_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::Table(table) => {
            if table.keys().any(|k| k != "value" && k != "comment") {
                return None;
            }
            match table.get("value")? {
                toml::Value::Table(_) => None,
                inner => input_text(inner),
            }
        }
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(x) => Some(x.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::Integer(i) => Some(i.to_string()),
                toml::Value::Float(x) => Some(x.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        toml::Value::Datetime(_) => None,
    }
}

/// Returns the comment of a `{ value, comment }` input entry, if any.
pub fn input_comment(value: &toml::Value) -> Option<&str> {
    value.as_table()?.get("comment")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_defaults() {
        let cache = CacheConfig::default();
        assert!(cache.enabled);
        assert_eq!(cache.backend, BackendKind::File);
        assert_eq!(cache.path, DEFAULT_CACHE_PATH);
    }

    #[test]
    fn key_path_defaults_per_backend() {
        let base = Path::new("/proj");
        let file = CacheConfig::default();
        assert_eq!(file.key_path(base), PathBuf::from("/proj/.geox-cache/key.key"));

        let sqlite = CacheConfig {
            backend: BackendKind::Sqlite,
            path: "db/cache.sqlite".to_string(),
            ..CacheConfig::default()
        };
        assert_eq!(sqlite.key_path(base), PathBuf::from("/proj/db/key.key"));
    }

    #[test]
    fn explicit_key_file_wins() {
        let cache = CacheConfig {
            key_file: Some("secrets/geox.key".to_string()),
            ..CacheConfig::default()
        };
        assert_eq!(
            cache.key_path(Path::new("/proj")),
            PathBuf::from("/proj/secrets/geox.key")
        );
    }

    #[test]
    fn explicit_principal_wins() {
        let cache = CacheConfig {
            principal: Some("analyst".to_string()),
            ..CacheConfig::default()
        };
        assert_eq!(cache.resolved_principal(), "analyst");
    }

    #[test]
    fn input_text_renders_scalars_and_lists() {
        assert_eq!(input_text(&toml::Value::Float(0.07)).unwrap(), "0.07");
        assert_eq!(input_text(&toml::Value::Integer(30)).unwrap(), "30");
        assert_eq!(input_text(&toml::Value::Boolean(true)).unwrap(), "true");
        let list = toml::Value::Array(vec![toml::Value::Float(1.5), toml::Value::Integer(2)]);
        assert_eq!(input_text(&list).unwrap(), "1.5, 2");
    }

    #[test]
    fn input_text_rejects_tables() {
        let table = toml::Value::Table(toml::map::Map::new());
        assert!(input_text(&table).is_none());
        let stray: toml::Value = toml::from_str("value = 3\nunits = \"m\"").unwrap();
        assert!(input_text(&stray).is_none());
    }

    #[test]
    fn commented_entry_gives_value_and_comment() {
        let entry: toml::Value =
            toml::from_str("value = 0.05\ncomment = \"lender quote\"").unwrap();
        assert_eq!(input_text(&entry).unwrap(), "0.05");
        assert_eq!(input_comment(&entry), Some("lender quote"));
        assert_eq!(input_comment(&toml::Value::Float(0.05)), None);
    }
}
