//! Property presence queries across an ancestor range
//!
//! Walks from a type up its super-type chain, one cache lookup per step so a
//! stale ancestor is rebuilt on the way. Without an explicit boundary the
//! walk stops below the root type (the first ancestor with no super type),
//! which is never included.

use super::ClassInfoCache;
use crate::core::TypeHandle;
use crate::info::{PropertyInfo, TypeInfo};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

impl ClassInfoCache {
    /// Whether a property named `name` is declared on `from` or an ancestor
    /// up to `until`. `until` is included only when `include_until` is set;
    /// with no `until` the root type is excluded.
    pub fn contains_member(&self, name: &str, from: TypeHandle, until: Option<TypeHandle>, include_until: bool) -> bool {
        self.property_chain(from, until, include_until)
            .is_some_and(|chain| chain.iter().any(|info| info.properties().contains_key(name)))
    }

    /// All properties from `from` up to `until`, a subtype's declaration
    /// overriding its ancestors' on a name collision. `None` if `from` is not
    /// a known type.
    pub fn all_properties(
        &self,
        from: TypeHandle,
        until: Option<TypeHandle>,
        include_until: bool,
    ) -> Option<HashMap<String, PropertyInfo>> {
        let chain = self.property_chain(from, until, include_until)?;

        let mut merged = HashMap::new();
        for info in chain.iter().rev() {
            for (name, property) in info.properties() {
                merged.insert(name.clone(), property.clone());
            }
        }
        Some(merged)
    }

    /// `name` declared on `from` or any ancestor below the root
    pub fn contains_property_key(&self, name: &str, from: TypeHandle) -> bool {
        self.contains_member(name, from, None, false)
    }

    /// `name` declared on `from` or any ancestor up to and including `until`
    pub fn contains_property_key_until(&self, name: &str, from: TypeHandle, until: TypeHandle) -> bool {
        self.contains_member(name, from, Some(until), true)
    }

    pub fn property_infos(&self, from: TypeHandle) -> Option<HashMap<String, PropertyInfo>> {
        self.all_properties(from, None, false)
    }

    pub fn property_infos_until(&self, from: TypeHandle, until: TypeHandle) -> Option<HashMap<String, PropertyInfo>> {
        self.all_properties(from, Some(until), true)
    }

    /// Types visited by a query, nearest first
    fn property_chain(
        &self,
        from: TypeHandle,
        until: Option<TypeHandle>,
        include_until: bool,
    ) -> Option<Vec<Arc<TypeInfo>>> {
        let mut chain = Vec::new();
        let mut current = Some(self.lookup(from)?);

        while let Some(info) = current {
            if until == Some(info.handle()) {
                if include_until {
                    chain.push(info);
                }
                break;
            }
            let Some(super_handle) = info.super_handle() else {
                // Root: only part of the walk when an explicit boundary was
                // never reached.
                if until.is_some() {
                    chain.push(info);
                }
                break;
            };
            if chain.len() >= self.config().max_ancestor_depth {
                warn!(type_name = info.name(), "property walk exceeded ancestor depth");
                break;
            }

            chain.push(info);
            current = self.lookup(super_handle);
        }

        Some(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    /// NSObject <- Grand("a") <- Parent("b") <- Child("c")
    fn hierarchy() -> (ClassInfoCache, [TypeHandle; 4]) {
        let host = Arc::new(MemoryHost::new());
        let root = host.define_type("NSObject", None).unwrap();
        host.add_property(root, "hash", "TQ,R");
        let grand = host.define_type("Grand", Some(root)).unwrap();
        host.add_property(grand, "a", "Ti,N,V_a");
        let parent = host.define_type("Parent", Some(grand)).unwrap();
        host.add_property(parent, "b", "Ti,N,V_b");
        let child = host.define_type("Child", Some(parent)).unwrap();
        host.add_property(child, "c", "Ti,N,V_c");

        (ClassInfoCache::new(host), [root, grand, parent, child])
    }

    #[test]
    fn test_default_boundary_excludes_root() {
        let (cache, [_, _, _, child]) = hierarchy();
        for name in ["a", "b", "c"] {
            assert!(cache.contains_property_key(name, child), "missing {name}");
        }
        assert!(!cache.contains_property_key("hash", child));
    }

    #[test]
    fn test_until_exclusive_and_inclusive() {
        let (cache, [_, _, parent, child]) = hierarchy();
        assert!(cache.contains_member("c", child, Some(parent), false));
        assert!(!cache.contains_member("b", child, Some(parent), false));
        assert!(!cache.contains_member("a", child, Some(parent), false));

        assert!(cache.contains_property_key_until("b", child, parent));
        assert!(!cache.contains_property_key_until("a", child, parent));
    }

    #[test]
    fn test_until_root_included_on_request() {
        let (cache, [root, _, _, child]) = hierarchy();
        assert!(cache.contains_property_key_until("hash", child, root));
        assert!(!cache.contains_member("hash", child, Some(root), false));
    }

    #[test]
    fn test_all_properties_merge() {
        let (cache, [_, grand, _, child]) = hierarchy();
        let all = cache.property_infos(child).unwrap();
        let mut names: Vec<_> = all.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c"]);

        let until_grand = cache.property_infos_until(child, grand).unwrap();
        assert_eq!(until_grand.len(), 3);
        assert!(cache.all_properties(child, Some(grand), false).unwrap().get("a").is_none());
    }

    #[test]
    fn test_child_overrides_parent() {
        let host = Arc::new(MemoryHost::new());
        let root = host.define_type("NSObject", None).unwrap();
        let base = host.define_type("Base", Some(root)).unwrap();
        host.add_property(base, "value", "Ti,N,V_value");
        let derived = host.define_type("Derived", Some(base)).unwrap();
        host.add_property(derived, "value", "Td,R,N");

        let cache = ClassInfoCache::new(host);
        let all = cache.property_infos(derived).unwrap();
        assert!(all["value"].is_readonly());
        assert_eq!(all["value"].type_encoding(), "d");
    }

    #[test]
    fn test_unknown_start() {
        let (cache, _) = hierarchy();
        let bogus = TypeHandle::new(999).unwrap();
        assert!(!cache.contains_property_key("a", bogus));
        assert!(cache.property_infos(bogus).is_none());
    }

    #[test]
    fn test_root_alone_is_empty() {
        let (cache, [root, ..]) = hierarchy();
        assert!(cache.property_infos(root).unwrap().is_empty());
    }
}
