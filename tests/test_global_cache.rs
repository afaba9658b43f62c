//! The process-wide cache can only be installed once, so everything that
//! touches it lives in a single test.

use classmeta::cache::global;
use classmeta::{CacheConfig, MemoryHost, MetaError};
use std::sync::Arc;

#[test]
fn test_global_install_once() {
    assert!(global::global().is_none());
    assert!(global::lookup_by_name("Widget").is_none());

    let host = Arc::new(MemoryHost::new());
    let widget = host.define_type("Widget", None).unwrap();
    host.add_property(widget, "title", "T@\"NSString\",C,N");

    let cache = global::install(host.clone(), CacheConfig::default()).unwrap();
    assert!(Arc::ptr_eq(
        &cache.lookup(widget).unwrap(),
        &global::lookup_by_name("Widget").unwrap()
    ));
    assert!(global::lookup(widget).unwrap().property("title").is_some());

    let again = global::install(host, CacheConfig::default());
    assert_eq!(again.err(), Some(MetaError::HostAlreadyInstalled));
}
