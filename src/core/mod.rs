//! Core identity types shared by the host boundary and the metadata model
//!
//! Type handles and entry points are opaque tokens handed out by the host.
//! Selectors are interned here so every component agrees on method identity.

pub mod intern;

pub use intern::{Selector, SelectorTable};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Opaque identifier for a type definition in the host environment.
///
/// Compared by identity only. A null handle cannot be constructed; host
/// APIs that may not have a type return `Option<TypeHandle>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHandle(NonZeroU64);

impl TypeHandle {
    /// Wrap a raw host identifier, `None` for the null value 0
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{:#x}", self.0.get())
    }
}

/// Callable entry point of a method, as an opaque address.
///
/// Captured once at extraction time; a method swapped in the host afterwards
/// leaves this value stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint(pub usize);

impl EntryPoint {
    pub const fn address(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle_rejected() {
        assert!(TypeHandle::new(0).is_none());
        let handle = TypeHandle::new(42).unwrap();
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle, TypeHandle::new(42).unwrap());
    }
}
