//! In-memory reflection host
//!
//! A complete `ReflectionHost` backed by plain tables. Types can be defined
//! and mutated at any time (members added, superclass changed), which is what
//! makes explicit cache invalidation necessary.

use super::{FieldHandle, FieldRef, MethodHandle, MethodRef, PropertyHandle, PropertyRef, ReflectionHost};
use crate::core::{EntryPoint, Selector, TypeHandle};
use crate::errors::MemberKind;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ENTRY_POINT_BASE: usize = 0x1000;
const ENTRY_POINT_STRIDE: usize = 0x10;

#[derive(Debug, Clone)]
pub struct MemoryField {
    name: String,
    offset: isize,
    encoding: String,
}

impl MemoryField {
    pub fn new(name: impl Into<String>, offset: isize, encoding: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset,
            encoding: encoding.into(),
        }
    }
}

impl FieldHandle for MemoryField {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn offset(&self) -> isize {
        self.offset
    }

    fn type_encoding(&self) -> Option<&str> {
        Some(&self.encoding)
    }
}

/// Method defined by its return encoding and positional argument encodings.
/// The combined encoding is the concatenation of both.
#[derive(Debug, Clone)]
pub struct MemoryMethod {
    name: String,
    return_type: String,
    arguments: Vec<String>,
    encoding: String,
    entry: Option<EntryPoint>,
}

impl MemoryMethod {
    pub fn new(name: impl Into<String>, return_type: &str, arguments: &[&str]) -> Self {
        let encoding = std::iter::once(return_type)
            .chain(arguments.iter().copied())
            .collect::<String>();

        Self {
            name: name.into(),
            return_type: return_type.to_string(),
            arguments: arguments.iter().map(|arg| arg.to_string()).collect(),
            encoding,
            entry: None,
        }
    }

    pub fn with_entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry = Some(entry);
        self
    }
}

impl MethodHandle for MemoryMethod {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn selector(&self) -> Option<Selector> {
        Some(Selector::register(&self.name))
    }

    fn entry_point(&self) -> Option<EntryPoint> {
        self.entry
    }

    fn type_encoding(&self) -> Option<&str> {
        Some(&self.encoding)
    }

    fn return_type_encoding(&self) -> Option<String> {
        Some(self.return_type.clone())
    }

    fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    fn argument_type(&self, index: usize) -> Option<String> {
        self.arguments.get(index).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryProperty {
    name: String,
    attributes: String,
}

impl MemoryProperty {
    pub fn new(name: impl Into<String>, attributes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into(),
        }
    }
}

impl PropertyHandle for MemoryProperty {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn attributes(&self) -> Option<&str> {
        Some(&self.attributes)
    }
}

#[derive(Default)]
struct TypeRecord {
    name: String,
    super_type: Option<TypeHandle>,
    meta: Option<TypeHandle>,
    is_meta: bool,
    fields: Vec<Option<FieldRef>>,
    methods: Vec<Option<MethodRef>>,
    properties: Vec<Option<PropertyRef>>,
}

#[derive(Default)]
struct Tables {
    types: Vec<TypeRecord>,
    names: HashMap<String, TypeHandle>,
}

impl Tables {
    fn get(&self, ty: TypeHandle) -> Option<&TypeRecord> {
        self.types.get(Self::index(ty))
    }

    fn get_mut(&mut self, ty: TypeHandle) -> Option<&mut TypeRecord> {
        self.types.get_mut(Self::index(ty))
    }

    fn index(ty: TypeHandle) -> usize {
        (ty.raw() - 1) as usize
    }

    fn push(&mut self, record: TypeRecord) -> Option<TypeHandle> {
        self.types.push(record);
        TypeHandle::new(self.types.len() as u64)
    }
}

/// Mutable in-memory type system
#[derive(Default)]
pub struct MemoryHost {
    tables: RwLock<Tables>,
    next_entry: AtomicUsize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a type and its meta type. Defining a name twice returns the
    /// existing handle.
    pub fn define_type(&self, name: &str, super_type: Option<TypeHandle>) -> Option<TypeHandle> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.names.get(name) {
            return Some(*existing);
        }

        let super_meta = super_type.and_then(|sup| tables.get(sup)).and_then(|rec| rec.meta);
        let meta = tables.push(TypeRecord {
            name: name.to_string(),
            super_type: super_meta,
            is_meta: true,
            ..TypeRecord::default()
        })?;
        let ty = tables.push(TypeRecord {
            name: name.to_string(),
            super_type,
            meta: Some(meta),
            ..TypeRecord::default()
        })?;

        tables.names.insert(name.to_string(), ty);
        Some(ty)
    }

    pub fn set_super_type(&self, ty: TypeHandle, super_type: Option<TypeHandle>) -> bool {
        self.with_record(ty, |rec| rec.super_type = super_type)
    }

    pub fn set_meta_type(&self, ty: TypeHandle, meta: Option<TypeHandle>) -> bool {
        self.with_record(ty, |rec| rec.meta = meta)
    }

    pub fn add_field(&self, ty: TypeHandle, name: &str, offset: isize, encoding: &str) -> bool {
        let field: FieldRef = Arc::new(MemoryField::new(name, offset, encoding));
        self.with_record(ty, |rec| rec.fields.push(Some(field)))
    }

    pub fn add_method(&self, ty: TypeHandle, method: MemoryMethod) -> bool {
        let method = match method.entry {
            Some(_) => method,
            None => {
                let slot = self.next_entry.fetch_add(1, Ordering::Relaxed);
                method.with_entry_point(EntryPoint(ENTRY_POINT_BASE + slot * ENTRY_POINT_STRIDE))
            }
        };
        let method: MethodRef = Arc::new(method);
        self.with_record(ty, |rec| rec.methods.push(Some(method)))
    }

    /// Add a method to the meta type of `ty`
    pub fn add_class_method(&self, ty: TypeHandle, method: MemoryMethod) -> bool {
        match self.meta_type(ty) {
            Some(meta) => self.add_method(meta, method),
            None => false,
        }
    }

    pub fn add_property(&self, ty: TypeHandle, name: &str, attributes: &str) -> bool {
        let property: PropertyRef = Arc::new(MemoryProperty::new(name, attributes));
        self.with_record(ty, |rec| rec.properties.push(Some(property)))
    }

    /// Report a null handle among the members of `ty`
    pub fn add_null_member(&self, ty: TypeHandle, kind: MemberKind) -> bool {
        self.with_record(ty, |rec| match kind {
            MemberKind::Field => rec.fields.push(None),
            MemberKind::Method => rec.methods.push(None),
            MemberKind::Property => rec.properties.push(None),
        })
    }

    pub fn type_count(&self) -> usize {
        self.tables.read().types.len()
    }

    fn with_record(&self, ty: TypeHandle, f: impl FnOnce(&mut TypeRecord)) -> bool {
        match self.tables.write().get_mut(ty) {
            Some(rec) => {
                f(rec);
                true
            }
            None => false,
        }
    }
}

impl ReflectionHost for MemoryHost {
    fn contains_type(&self, ty: TypeHandle) -> bool {
        self.tables.read().get(ty).is_some()
    }

    fn type_name(&self, ty: TypeHandle) -> Option<String> {
        self.tables.read().get(ty).map(|rec| rec.name.clone())
    }

    fn resolve_type(&self, name: &str) -> Option<TypeHandle> {
        self.tables.read().names.get(name).copied()
    }

    fn super_type(&self, ty: TypeHandle) -> Option<TypeHandle> {
        self.tables.read().get(ty).and_then(|rec| rec.super_type)
    }

    fn meta_type(&self, ty: TypeHandle) -> Option<TypeHandle> {
        self.tables.read().get(ty).and_then(|rec| rec.meta)
    }

    fn is_meta(&self, ty: TypeHandle) -> bool {
        self.tables.read().get(ty).is_some_and(|rec| rec.is_meta)
    }

    fn fields(&self, ty: TypeHandle) -> Vec<Option<FieldRef>> {
        self.tables.read().get(ty).map(|rec| rec.fields.clone()).unwrap_or_default()
    }

    fn methods(&self, ty: TypeHandle) -> Vec<Option<MethodRef>> {
        self.tables.read().get(ty).map(|rec| rec.methods.clone()).unwrap_or_default()
    }

    fn properties(&self, ty: TypeHandle) -> Vec<Option<PropertyRef>> {
        self.tables.read().get(ty).map(|rec| rec.properties.clone()).unwrap_or_default()
    }
}
