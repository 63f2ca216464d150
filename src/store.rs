//! Shared key-value storage for passing values between cases.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// A concurrency-safe string-to-string map with last-write-wins semantics.
///
/// One instance lives for the duration of a suite run. Construct with
/// [`Store::new`] for an isolated instance, or call [`shared`] for the
/// process-wide instance shared between independent cases. No eviction, no
/// persistence.
#[derive(Debug, Default)]
pub struct Store {
    db: RwLock<HashMap<String, String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key to a value, overwriting unconditionally.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut db = self.db.write().expect("store lock poisoned");
        db.insert(key.into(), value.into());
    }

    /// Look up a key, returning `None` when it was never set.
    pub fn get(&self, key: &str) -> Option<String> {
        let db = self.db.read().expect("store lock poisoned");
        db.get(key).cloned()
    }
}

/// The process-wide store shared between cases across invocation sites.
pub fn shared() -> &'static Store {
    static SHARED: OnceLock<Store> = OnceLock::new();
    SHARED.get_or_init(Store::new)
}
