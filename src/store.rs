//! Ordered key/value storage used for environment variables and aliases.

/// One entry of a [`Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    /// Render as `key=value`.
    pub fn joined(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Insertion-ordered mapping with linear lookups.
///
/// Overwriting an existing key keeps its original position, so listing the
/// store always reflects the order in which keys were first defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    entries: Vec<Entry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns the index of the entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> usize {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => {
                self.entries[index].value = value;
                index
            }
            None => {
                self.entries.push(Entry { key, value });
                self.entries.len() - 1
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// First entry whose key starts with `partial`.
    pub fn find_prefix(&self, partial: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key.starts_with(partial))
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Remove the entry at `index`. Returns `false` when out of range.
    pub fn delete_at(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    /// Remove `key` if present. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(index) => self.delete_at(index),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Store {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Store::new();
        for (k, v) in iter {
            store.insert(k, v);
        }
        store
    }
}
