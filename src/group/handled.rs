//! Run-scoped registry of handled dependency names

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Names of dependencies resolved during the current run
///
/// Created once per run and threaded through every group compilation.
/// Names are only ever added. Lookups ignore ASCII case, matching how
/// group members are resolved against parsed dependencies; the first
/// spelling seen is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandledDependencies {
    names: BTreeMap<String, String>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl HandledDependencies {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` handled; returns false if it already was
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.names.entry(key(&name)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(name);
                true
            }
        }
    }

    /// Mark every name in `names` handled
    pub fn add_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add(name);
        }
    }

    /// Returns true if `name` was handled earlier in this run
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&key(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Handled names, sorted case-insensitively
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }
}

/// Handled registry shared by group passes running on separate tasks
///
/// Every access goes through the lock, so at most one pass writes at a time.
#[derive(Debug, Clone, Default)]
pub struct SharedHandledDependencies {
    inner: Arc<Mutex<HandledDependencies>>,
}

impl SharedHandledDependencies {
    pub fn new(handled: HandledDependencies) -> Self {
        Self {
            inner: Arc::new(Mutex::new(handled)),
        }
    }

    /// Lock the registry for the duration of one group pass
    pub async fn lock(&self) -> MutexGuard<'_, HandledDependencies> {
        self.inner.lock().await
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> HandledDependencies {
        self.inner.lock().await.clone()
    }
}
