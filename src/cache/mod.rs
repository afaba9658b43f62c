//! Type metadata cache
//!
//! Memoizes one `TypeInfo` per type handle, also indexed by type name.
//!
//! Reads of cached entries only take DashMap shard read locks. A miss takes
//! a per-handle re-entrant build lock for the whole check/build/insert step,
//! so at most one build runs per type while different types build in
//! parallel. The super type is resolved by a top-level lookup on its own key
//! from inside the build; cyclic host data re-enters the same lock and is cut
//! off by `max_ancestor_depth`. A super type the host cannot produce leaves
//! `super_info` empty instead of failing the subtype.
//!
//! Invalidation flags an entry stale instead of evicting it. The next lookup
//! builds a new instance and replaces the entry under both keys. An entry
//! whose ancestor chain holds a stale instance is rebuilt the same way, so
//! descendants pick up the replacement on their next lookup.

pub mod global;
pub mod query;

use crate::config::CacheConfig;
use crate::core::TypeHandle;
use crate::errors::{MetaError, Result};
use crate::host::ReflectionHost;
use crate::info::TypeInfo;
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub invalidations: u64,
    pub dropped_members: u64,
    pub duplicate_members: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    invalidations: AtomicU64,
    dropped_members: AtomicU64,
    duplicate_members: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            dropped_members: self.dropped_members.load(Ordering::Relaxed),
            duplicate_members: self.duplicate_members.load(Ordering::Relaxed),
        }
    }
}

/// Thread-safe, invalidatable cache of per-type metadata
pub struct ClassInfoCache {
    host: Arc<dyn ReflectionHost>,
    config: CacheConfig,

    /// Type handle → info
    by_handle: DashMap<TypeHandle, Arc<TypeInfo>>,

    /// Type name → info, non-meta types only
    by_name: DashMap<String, Arc<TypeInfo>>,

    /// One build lock per type handle ever looked up
    build_locks: DashMap<TypeHandle, Arc<ReentrantMutex<()>>>,

    counters: Counters,
}

impl ClassInfoCache {
    pub fn new(host: Arc<dyn ReflectionHost>) -> Self {
        Self::with_config(host, CacheConfig::default())
    }

    pub fn with_config(host: Arc<dyn ReflectionHost>, config: CacheConfig) -> Self {
        Self {
            host,
            config,
            by_handle: DashMap::new(),
            by_name: DashMap::new(),
            build_locks: DashMap::new(),
            counters: Counters::default(),
        }
    }

    pub fn host(&self) -> &dyn ReflectionHost {
        &*self.host
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Metadata for `handle`, building it (and any uncached ancestors) on
    /// first access. `None` if the host does not know the type.
    pub fn lookup(&self, handle: TypeHandle) -> Option<Arc<TypeInfo>> {
        self.lookup_at_depth(handle, 0).found()
    }

    /// Metadata for the type the host resolves `name` to
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
        match self.host.resolve_type(name) {
            Some(handle) => self.lookup(handle),
            None => {
                trace!(name, "type name not resolved");
                None
            }
        }
    }

    /// Like [`lookup_by_name`](Self::lookup_by_name), for callers that want
    /// an error rather than `None`
    pub fn require_by_name(&self, name: &str) -> Result<Arc<TypeInfo>> {
        self.lookup_by_name(name).ok_or_else(|| MetaError::TypeNotFound {
            name: name.to_string(),
        })
    }

    /// Mark `info` stale. It stays readable; lookups build a replacement.
    pub fn invalidate(&self, info: &TypeInfo) {
        info.set_needs_update();
        Counters::bump(&self.counters.invalidations, 1);
        debug!(type_name = info.name(), handle = %info.handle(), "type info invalidated");
    }

    /// Mark the cached entry for `handle` stale, if there is one
    pub fn invalidate_type(&self, handle: TypeHandle) -> bool {
        let Some(info) = self.cached(handle) else {
            return false;
        };
        self.invalidate(&info);
        true
    }

    /// Cached entry for `handle` without building, stale or not
    pub fn cached(&self, handle: TypeHandle) -> Option<Arc<TypeInfo>> {
        self.by_handle.get(&handle).map(|entry| entry.value().clone())
    }

    /// Cached entry for `name` without building, stale or not
    pub fn cached_by_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Warm the cache for many types in parallel; returns how many resolved
    pub fn prefetch(&self, handles: &[TypeHandle]) -> usize {
        let run = || handles.par_iter().filter(|handle| self.lookup(**handle).is_some()).count();

        match self.config.prefetch.threads {
            0 => run(),
            threads => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(err) => {
                    warn!(threads, error = %err, "prefetch pool unavailable, using global pool");
                    run()
                }
            },
        }
    }

    /// Drop every cached entry. Instances held by callers stay valid.
    pub fn clear(&self) {
        self.by_handle.clear();
        self.by_name.clear();
    }

    /// Number of cached types, including stale entries
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Cached entry usable as is: neither it nor any ancestor it was built
    /// against has been invalidated
    fn fresh(&self, handle: TypeHandle) -> Option<Arc<TypeInfo>> {
        self.by_handle
            .get(&handle)
            .filter(|entry| !entry.ancestors().any(TypeInfo::needs_update))
            .map(|entry| entry.value().clone())
    }

    fn build_lock(&self, handle: TypeHandle) -> Arc<ReentrantMutex<()>> {
        self.build_locks
            .entry(handle)
            .or_insert_with(|| Arc::new(ReentrantMutex::new(())))
            .clone()
    }

    fn lookup_at_depth(&self, handle: TypeHandle, depth: usize) -> Resolution {
        if let Some(info) = self.fresh(handle) {
            Counters::bump(&self.counters.hits, 1);
            return Resolution::Found(info);
        }

        if depth > self.config.max_ancestor_depth {
            warn!(%handle, depth, "super type chain too deep, giving up");
            return Resolution::TooDeep;
        }

        if !self.host.contains_type(handle) {
            trace!(%handle, "type handle not known to host");
            return Resolution::Absent;
        }

        let lock = self.build_lock(handle);
        let _guard = lock.lock();

        // Another thread may have finished the build while this one waited.
        if let Some(info) = self.fresh(handle) {
            Counters::bump(&self.counters.hits, 1);
            return Resolution::Found(info);
        }

        Counters::bump(&self.counters.misses, 1);
        self.build_and_insert(handle, depth)
    }

    #[instrument(level = "debug", skip(self))]
    fn build_and_insert(&self, handle: TypeHandle, depth: usize) -> Resolution {
        let super_info = match self.host.super_type(handle) {
            Some(super_handle) => match self.lookup_at_depth(super_handle, depth + 1) {
                Resolution::Found(info) => Some(info),
                Resolution::Absent => {
                    warn!(%handle, %super_handle, "super type unavailable, building without it");
                    None
                }
                Resolution::TooDeep => return Resolution::TooDeep,
            },
            None => None,
        };

        let Some((info, report)) = TypeInfo::build(&*self.host, handle, super_info, &self.config.duplicates) else {
            debug!(%handle, "host could not name type");
            return Resolution::Absent;
        };
        let info = Arc::new(info);

        // A replaced entry may be fresh itself but built against a stale
        // ancestor; flag it so holders see it is outdated.
        if let Some(replaced) = self.by_handle.insert(handle, info.clone()) {
            replaced.set_needs_update();
        }
        if !info.is_meta() {
            self.by_name.insert(info.name().to_string(), info.clone());
        }

        Counters::bump(&self.counters.builds, 1);
        Counters::bump(&self.counters.dropped_members, report.dropped as u64);
        Counters::bump(&self.counters.duplicate_members, report.duplicates as u64);
        debug!(
            type_name = info.name(),
            fields = info.fields().len(),
            methods = info.methods().len(),
            properties = info.properties().len(),
            dropped = report.dropped,
            "type info built"
        );

        Resolution::Found(info)
    }
}

/// Outcome of an internal lookup. Only a depth overflow aborts the types
/// below it; an absent super type is built around.
enum Resolution {
    Found(Arc<TypeInfo>),
    Absent,
    TooDeep,
}

impl Resolution {
    fn found(self) -> Option<Arc<TypeInfo>> {
        match self {
            Self::Found(info) => Some(info),
            Self::Absent | Self::TooDeep => None,
        }
    }
}
