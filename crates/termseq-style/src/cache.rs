#![forbid(unsafe_code)]

//! Resolved formatters keyed by attribute name.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::formatter::Formatter;

/// Thread-safe map from attribute name to its resolved [`Formatter`].
///
/// Inserts keep the first value stored under a name, so racing resolutions
/// of the same name agree on one result.
#[derive(Debug, Default)]
pub struct FormatterCache {
    entries: RwLock<HashMap<String, Formatter>>,
}

impl FormatterCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Formatter> {
        let entries = self.entries.read().expect("FormatterCache lock poisoned");
        entries.get(name).cloned()
    }

    /// Store `formatter` unless `name` already has one; returns the stored
    /// value.
    pub fn install(&self, name: &str, formatter: Formatter) -> Formatter {
        let mut entries = self.entries.write().expect("FormatterCache lock poisoned");
        entries.entry(name.to_string()).or_insert(formatter).clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.read().expect("FormatterCache lock poisoned");
        entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().expect("FormatterCache lock poisoned");
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("FormatterCache lock poisoned");
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_install_wins() {
        let cache = FormatterCache::new();
        let first = Formatter::simple("bold", "\x1b[1m", "\x1b[m");
        let second = Formatter::simple("bold", "\x1b[2m", "\x1b[m");
        assert_eq!(cache.install("bold", first.clone()), first);
        assert_eq!(cache.install("bold", second), first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_and_clear() {
        let cache = FormatterCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("x").is_none());
        cache.install("x", Formatter::Null);
        assert!(cache.contains("x"));
        assert_eq!(cache.get("x"), Some(Formatter::Null));
        cache.clear();
        assert!(cache.is_empty());
    }
}
