//! Raw parameter map shared by all tokenizers.

use std::collections::HashMap;
use std::collections::hash_map;

/// Parameter names whose values are never shown in debug output.
const SENSITIVE_KEYS: &[&str] = &["password", "keystoresecret"];

/// Untyped key/value pairs produced by a tokenizer.
///
/// Keys are normalized to lower case on insertion; the map itself is
/// case-sensitive. Inserting an existing key replaces its value, so the
/// last assignment of a parameter wins.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pairs: HashMap<String, String>,
}

impl RawParams {
    /// Create an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a parameter name.
    #[must_use]
    pub fn normalize_key(key: &str) -> String {
        key.to_lowercase()
    }

    /// Insert a pair, lower-casing the key. Returns the replaced value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.pairs.insert(Self::normalize_key(key), value.into())
    }

    /// Look up a parameter by its lower-case name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Check whether a parameter is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over parameter names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v);
        }
        params
    }
}

impl IntoIterator for RawParams {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl std::fmt::Debug for RawParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.pairs {
            if SENSITIVE_KEYS.contains(&key.as_str()) {
                map.entry(key, &"[REDACTED]");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}
