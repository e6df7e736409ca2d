//! Per-request shared variable namespace.
//!
//! An explicit key/value context carried through the handler chain in the
//! request extensions: one middleware stage publishes a named string value
//! and any later stage holding a clone reads it. Scoped to a single
//! request; nothing here outlives the response.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

/// Fixed key under which the identity extractor publishes the caller
/// identity.
pub const IDENTITY_VAR: &str = "identity.header";

/// Per-request key/value namespace shared along the handler chain.
///
/// Cloning is cheap and all clones observe the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct VarMap {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl VarMap {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    /// Reads the value published under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
