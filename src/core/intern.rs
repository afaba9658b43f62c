//! Selector interning
//!
//! Maps method and accessor names to compact `Selector` tokens so two
//! selectors with the same name compare equal by integer identity.
//! Uses bidirectional concurrent maps for O(1) lookups in both directions.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Global selector table shared by hosts and the metadata model
static SELECTORS: Lazy<SelectorTable> = Lazy::new(SelectorTable::new);

/// Interned method name
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(u32);

impl Selector {
    /// Register `name` in the global table, returning the existing token if
    /// the name was seen before
    pub fn register(name: &str) -> Self {
        SELECTORS.intern(name)
    }

    /// Look up a selector without registering it
    pub fn lookup(name: &str) -> Option<Self> {
        SELECTORS.get(name)
    }

    pub fn name(self) -> Arc<str> {
        SELECTORS.name(self).unwrap_or_else(|| Arc::from(""))
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({:?})", self.name())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Thread-safe selector interning table
pub struct SelectorTable {
    /// name → Selector
    by_name: DashMap<Arc<str>, Selector>,
    /// Selector id → name
    by_id: DashMap<u32, Arc<str>>,
    next_id: AtomicU32,
}

impl SelectorTable {
    pub fn new() -> Self {
        Self {
            by_name: DashMap::with_capacity(1024),
            by_id: DashMap::with_capacity(1024),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn intern(&self, name: &str) -> Selector {
        if let Some(sel) = self.by_name.get(name) {
            return *sel;
        }

        // The entry guard holds the shard lock, so two threads interning the
        // same name agree on one id.
        match self.by_name.entry(Arc::from(name)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                self.by_id.insert(id, entry.key().clone());
                *entry.insert(Selector(id))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Selector> {
        self.by_name.get(name).map(|sel| *sel)
    }

    pub fn name(&self, sel: Selector) -> Option<Arc<str>> {
        self.by_id.get(&sel.0).map(|name| name.clone())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_intern_same_name() {
        let a = Selector::register("setName:");
        let b = Selector::register("setName:");
        assert_eq!(a, b, "Same name should get same selector");
        assert_eq!(&*a.name(), "setName:");
    }

    #[test]
    fn test_lookup_unregistered() {
        assert!(Selector::lookup("neverRegisteredSelectorName:with:").is_none());
    }

    #[test]
    fn test_concurrent_intern() {
        let table = Arc::new(SelectorTable::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                thread::spawn(move || table.intern("description"))
            })
            .collect();

        let ids: Vec<Selector> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(table.len(), 1);
    }
}
