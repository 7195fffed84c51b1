//! Process-wide flyweight cache keyed by canonical strings.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::MessageResult;

/// Thread-safe cache handing out one shared `Arc<T>` per canonical key.
///
/// Entries are never evicted. Construction happens outside the write lock
/// only when the key is absent; if two threads race, the first insert wins
/// and both callers receive the same instance.
pub struct Interner<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Interner<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(key).cloned()
    }

    /// Returns the cached instance for `key`, building it with `create` on a miss.
    pub fn get_or_try_insert<F>(&self, key: &str, create: F) -> MessageResult<Arc<T>>
    where
        F: FnOnce() -> MessageResult<T>,
    {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }

        let created = Arc::new(create()?);
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(entries
            .entry(key.to_string())
            .or_insert(created)
            .clone())
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_same_instance_for_same_key() {
        let interner: Interner<String> = Interner::new();
        let a = interner
            .get_or_try_insert("k", || Ok("value".to_string()))
            .unwrap();
        let b = interner
            .get_or_try_insert("k", || Ok("other".to_string()))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "value");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn failed_creation_is_not_cached() {
        let interner: Interner<String> = Interner::new();
        let err = interner.get_or_try_insert("k", || {
            Err(crate::error::MessageError::assertion("nope"))
        });
        assert!(err.is_err());
        assert!(interner.is_empty());
    }
}
