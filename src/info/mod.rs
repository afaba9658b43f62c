//! Immutable metadata snapshots
//!
//! One `FieldInfo`, `MethodInfo` or `PropertyInfo` per member handle, grouped
//! per type in a `TypeInfo`. All of them are built once from host handles and
//! never mutated; a changed type gets a new `TypeInfo`.

pub mod field;
pub mod method;
pub mod property;
pub mod type_info;

pub use field::FieldInfo;
pub use method::MethodInfo;
pub use property::PropertyInfo;
pub use type_info::{BuildReport, TypeInfo, TypeSummary};
