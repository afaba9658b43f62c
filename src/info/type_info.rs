//! Per-type aggregate of member metadata
//!
//! A `TypeInfo` holds only the members declared directly on its type.
//! Inherited members are reached through `super_info`, which is the shared
//! cached instance of the super type, not a copy.

use super::{FieldInfo, MethodInfo, PropertyInfo};
use crate::config::{DuplicateConfig, DuplicatePolicy};
use crate::core::TypeHandle;
use crate::errors::{MemberKind, Result};
use crate::host::ReflectionHost;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct TypeInfo {
    handle: TypeHandle,
    super_handle: Option<TypeHandle>,
    meta_handle: Option<TypeHandle>,
    is_meta: bool,
    name: String,
    super_info: Option<Arc<TypeInfo>>,
    fields: HashMap<String, FieldInfo>,
    methods: HashMap<String, MethodInfo>,
    properties: HashMap<String, PropertyInfo>,
    needs_update: AtomicBool,
}

/// Counters from one build, folded into the cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub dropped: usize,
    pub duplicates: usize,
}

impl TypeInfo {
    /// Extract the metadata of `handle` from the host.
    ///
    /// Members whose handles fail to construct are skipped. Returns `None`
    /// when the host cannot name the type.
    pub fn build(
        host: &dyn ReflectionHost,
        handle: TypeHandle,
        super_info: Option<Arc<TypeInfo>>,
        duplicates: &DuplicateConfig,
    ) -> Option<(Self, BuildReport)> {
        let name = host.type_name(handle)?;
        let is_meta = host.is_meta(handle);
        let mut report = BuildReport::default();

        let fields = collect_members(
            &name,
            MemberKind::Field,
            host.fields(handle).iter().map(|h| FieldInfo::from_handle(h.as_deref())),
            FieldInfo::name,
            duplicates,
            &mut report,
        );
        let methods = collect_members(
            &name,
            MemberKind::Method,
            host.methods(handle).iter().map(|h| MethodInfo::from_handle(h.as_deref())),
            MethodInfo::name,
            duplicates,
            &mut report,
        );
        let properties = collect_members(
            &name,
            MemberKind::Property,
            host.properties(handle)
                .iter()
                .map(|h| PropertyInfo::from_handle(h.as_deref(), host)),
            PropertyInfo::name,
            duplicates,
            &mut report,
        );

        let info = Self {
            handle,
            super_handle: host.super_type(handle),
            meta_handle: host.meta_type(handle),
            is_meta,
            name,
            super_info,
            fields,
            methods,
            properties,
            needs_update: AtomicBool::new(false),
        };

        Some((info, report))
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    pub fn super_handle(&self) -> Option<TypeHandle> {
        self.super_handle
    }

    pub fn meta_handle(&self) -> Option<TypeHandle> {
        self.meta_handle
    }

    pub fn is_meta(&self) -> bool {
        self.is_meta
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn super_info(&self) -> Option<&Arc<TypeInfo>> {
        self.super_info.as_ref()
    }

    pub fn fields(&self) -> &HashMap<String, FieldInfo> {
        &self.fields
    }

    pub fn methods(&self) -> &HashMap<String, MethodInfo> {
        &self.methods
    }

    pub fn properties(&self) -> &HashMap<String, PropertyInfo> {
        &self.properties
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// Mark this snapshot as stale. Call after mutating the type in the
    /// host; the next cache lookup builds a replacement.
    pub fn set_needs_update(&self) {
        self.needs_update.store(true, Ordering::Release);
    }

    /// Whether this snapshot has been invalidated and should be re-fetched
    pub fn needs_update(&self) -> bool {
        self.needs_update.load(Ordering::Acquire)
    }

    /// This type followed by each super type, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeInfo> {
        std::iter::successors(Some(self), |info| info.super_info.as_deref())
    }

    pub fn summary(&self) -> TypeSummary<'_> {
        TypeSummary {
            name: &self.name,
            handle: self.handle,
            super_type: self.super_info.as_ref().map(|info| info.name()),
            is_meta: self.is_meta,
            stale: self.needs_update(),
            fields: self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            methods: self.methods.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            properties: self.properties.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.summary())
    }
}

/// Serializable view of a `TypeInfo`, with members in name order
#[derive(Debug, Serialize)]
pub struct TypeSummary<'a> {
    pub name: &'a str,
    pub handle: TypeHandle,
    pub super_type: Option<&'a str>,
    pub is_meta: bool,
    pub stale: bool,
    pub fields: BTreeMap<&'a str, &'a FieldInfo>,
    pub methods: BTreeMap<&'a str, &'a MethodInfo>,
    pub properties: BTreeMap<&'a str, &'a PropertyInfo>,
}

fn collect_members<T>(
    type_name: &str,
    kind: MemberKind,
    members: impl Iterator<Item = Result<T>>,
    name_of: impl Fn(&T) -> &str,
    duplicates: &DuplicateConfig,
    report: &mut BuildReport,
) -> HashMap<String, T> {
    let mut map = HashMap::new();

    for member in members {
        let info = match member {
            Ok(info) => info,
            Err(err) => {
                report.dropped += 1;
                debug!(type_name, %kind, error = %err, "dropping member");
                continue;
            }
        };

        match map.entry(name_of(&info).to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(info);
            }
            Entry::Occupied(mut slot) => {
                report.duplicates += 1;
                if duplicates.warn {
                    warn!(type_name, %kind, member = slot.key().as_str(), policy = ?duplicates.policy, "duplicate member name");
                }
                if duplicates.policy == DuplicatePolicy::LastWins {
                    slot.insert(info);
                }
            }
        }
    }

    map
}
