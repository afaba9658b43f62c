use crate::core::{Selector, TypeHandle};
use crate::encoding::{classify, parse_object_type, split_attributes, EncodedType, EncodingKind, PropertyAttributes};
use crate::errors::{MemberKind, MetaError, Result};
use crate::host::{PropertyHandle, ReflectionHost};
use serde::Serialize;

/// Snapshot of one declared property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyInfo {
    name: String,
    #[serde(rename = "type")]
    ty: EncodedType,
    type_encoding: String,
    backing_field: String,
    declared_type: Option<TypeHandle>,
    protocols: Option<Vec<String>>,
    pseudo_generic: Option<TypeHandle>,
    getter: Selector,
    setter: Selector,
}

impl PropertyInfo {
    /// Read a property handle and decode its attribute string.
    ///
    /// Class and protocol names in an object type are resolved through
    /// `host`; names the host does not know leave the handle fields empty.
    pub fn from_handle(handle: Option<&dyn PropertyHandle>, host: &dyn ReflectionHost) -> Result<Self> {
        let handle = handle.ok_or_else(|| MetaError::null_handle(MemberKind::Property))?;
        let name = handle
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MetaError::invalid(MemberKind::Property, "property has no name"))?;

        let mut ty = EncodedType::UNKNOWN;
        let mut type_encoding = String::new();
        let mut backing_field = String::new();
        let mut declared_type = None;
        let mut protocols = None;
        let mut pseudo_generic = None;
        let mut flags = PropertyAttributes::empty();
        let mut getter = None;
        let mut setter = None;

        for attr in split_attributes(handle.attributes().unwrap_or_default()) {
            match attr.code {
                'T' => {
                    ty = classify(&attr.value);
                    if ty.kind == EncodingKind::Object {
                        if let Some(object) = parse_object_type(&attr.value) {
                            declared_type = object.class_name.and_then(|class| host.resolve_type(class));
                            if !object.protocols.is_empty() {
                                pseudo_generic = object.protocols.iter().find_map(|p| host.resolve_type(p));
                                protocols = Some(object.protocols.iter().map(|p| p.to_string()).collect());
                            }
                        }
                    }
                    type_encoding = attr.value;
                }
                'V' => backing_field = attr.value,
                'G' => {
                    flags |= PropertyAttributes::CUSTOM_GETTER;
                    if !attr.value.is_empty() {
                        getter = Some(Selector::register(&attr.value));
                    }
                }
                'S' => {
                    flags |= PropertyAttributes::CUSTOM_SETTER;
                    if !attr.value.is_empty() {
                        setter = Some(Selector::register(&attr.value));
                    }
                }
                code => {
                    if let Some(flag) = PropertyAttributes::from_code(code) {
                        flags |= flag;
                    }
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            ty: ty.with_attributes(flags),
            type_encoding,
            backing_field,
            declared_type,
            protocols,
            pseudo_generic,
            getter: getter.unwrap_or_else(|| Selector::register(name)),
            setter: setter.unwrap_or_else(|| Selector::register(&default_setter_name(name))),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> EncodedType {
        self.ty
    }

    pub fn attributes(&self) -> PropertyAttributes {
        self.ty.attributes
    }

    pub fn type_encoding(&self) -> &str {
        &self.type_encoding
    }

    /// Backing instance variable, empty when the property has none
    pub fn backing_field(&self) -> &str {
        &self.backing_field
    }

    pub fn declared_type(&self) -> Option<TypeHandle> {
        self.declared_type
    }

    pub fn protocols(&self) -> Option<&[String]> {
        self.protocols.as_deref()
    }

    /// Element type named by a protocol that is also a type, e.g. `Person`
    /// in `NSArray<Person>`
    pub fn pseudo_generic(&self) -> Option<TypeHandle> {
        self.pseudo_generic
    }

    pub fn getter(&self) -> Selector {
        self.getter
    }

    pub fn setter(&self) -> Selector {
        self.setter
    }

    pub fn is_readonly(&self) -> bool {
        self.ty.attributes.contains(PropertyAttributes::READONLY)
    }
}

/// `title` → `setTitle:`
fn default_setter_name(name: &str) -> String {
    let mut chars = name.chars();
    let mut setter = String::with_capacity(name.len() + 4);
    setter.push_str("set");
    if let Some(first) = chars.next() {
        setter.extend(first.to_uppercase());
    }
    setter.push_str(chars.as_str());
    setter.push(':');
    setter
}
