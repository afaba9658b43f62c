// Core modules
pub mod core;
pub mod encoding;
pub mod host;
pub mod info;
pub mod cache;
pub mod config;
pub mod errors;
pub mod logging;

// Re-export commonly used items
pub use core::{EntryPoint, Selector, TypeHandle};
pub use encoding::{classify, try_classify, EncodedType, EncodingKind, PropertyAttributes, Qualifiers};
pub use host::{FieldHandle, MemoryHost, MethodHandle, PropertyHandle, ReflectionHost};
pub use info::{FieldInfo, MethodInfo, PropertyInfo, TypeInfo};
pub use cache::{CacheStats, ClassInfoCache};
pub use cache::global::{global, install};
pub use config::{CacheConfig, DuplicatePolicy};
pub use errors::{MemberKind, MetaError, Result};
pub use logging::{init_logging, LogConfig};
