//! Process-wide cache
//!
//! Installed once with the host the process reflects over, then shared for
//! the life of the process. There is no teardown.

use super::ClassInfoCache;
use crate::config::CacheConfig;
use crate::core::TypeHandle;
use crate::errors::{MetaError, Result};
use crate::host::ReflectionHost;
use crate::info::TypeInfo;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

static GLOBAL: OnceCell<ClassInfoCache> = OnceCell::new();

/// Install the process-wide cache. Fails if one is already installed.
pub fn install(host: Arc<dyn ReflectionHost>, config: CacheConfig) -> Result<&'static ClassInfoCache> {
    let mut installed = false;
    let cache = GLOBAL.get_or_init(|| {
        installed = true;
        ClassInfoCache::with_config(host, config)
    });

    if installed {
        info!("global type info cache installed");
        Ok(cache)
    } else {
        Err(MetaError::HostAlreadyInstalled)
    }
}

/// The process-wide cache, if installed
pub fn global() -> Option<&'static ClassInfoCache> {
    GLOBAL.get()
}

/// Look up `handle` in the process-wide cache
pub fn lookup(handle: TypeHandle) -> Option<Arc<TypeInfo>> {
    global()?.lookup(handle)
}

/// Look up `name` in the process-wide cache
pub fn lookup_by_name(name: &str) -> Option<Arc<TypeInfo>> {
    global()?.lookup_by_name(name)
}
