//! Host reflection boundary
//!
//! The cache never talks to a type system directly. Anything that can
//! enumerate a type's fields, methods and properties and report their
//! encodings can back it by implementing `ReflectionHost`.
//!
//! Member enumeration returns `Option` per member: `None` stands for a null
//! handle reported by the host, which the cache drops without failing the
//! build.

pub mod memory;

pub use memory::{MemoryField, MemoryHost, MemoryMethod, MemoryProperty};

use crate::core::{EntryPoint, Selector, TypeHandle};
use std::sync::Arc;

/// Accessors on one instance-variable handle
pub trait FieldHandle: Send + Sync {
    fn name(&self) -> Option<&str>;
    /// Byte offset within the instance layout
    fn offset(&self) -> isize;
    fn type_encoding(&self) -> Option<&str>;
}

/// Accessors on one method handle
pub trait MethodHandle: Send + Sync {
    fn name(&self) -> Option<&str>;
    /// Identity token, `None` to have one derived from the name
    fn selector(&self) -> Option<Selector>;
    fn entry_point(&self) -> Option<EntryPoint>;
    /// Combined return-and-arguments encoding
    fn type_encoding(&self) -> Option<&str>;
    fn return_type_encoding(&self) -> Option<String>;
    fn argument_count(&self) -> usize;
    /// Encoding of the argument at `index`, `None` if the host cannot report it
    fn argument_type(&self, index: usize) -> Option<String>;
}

/// Accessors on one declared-property handle
pub trait PropertyHandle: Send + Sync {
    fn name(&self) -> Option<&str>;
    /// Comma-delimited attribute encoding, e.g. `T@"NSString",C,N,V_name`
    fn attributes(&self) -> Option<&str>;
}

pub type FieldRef = Arc<dyn FieldHandle>;
pub type MethodRef = Arc<dyn MethodHandle>;
pub type PropertyRef = Arc<dyn PropertyHandle>;

/// Native reflection primitives of the host type system
pub trait ReflectionHost: Send + Sync {
    /// Whether `ty` names a live type definition
    fn contains_type(&self, ty: TypeHandle) -> bool;

    fn type_name(&self, ty: TypeHandle) -> Option<String>;

    fn resolve_type(&self, name: &str) -> Option<TypeHandle>;

    fn super_type(&self, ty: TypeHandle) -> Option<TypeHandle>;

    fn meta_type(&self, ty: TypeHandle) -> Option<TypeHandle>;

    fn is_meta(&self, ty: TypeHandle) -> bool;

    /// Fields declared directly on `ty`
    fn fields(&self, ty: TypeHandle) -> Vec<Option<FieldRef>>;

    /// Methods declared directly on `ty`
    fn methods(&self, ty: TypeHandle) -> Vec<Option<MethodRef>>;

    /// Properties declared directly on `ty`
    fn properties(&self, ty: TypeHandle) -> Vec<Option<PropertyRef>>;
}
