use crate::encoding::{classify, EncodedType};
use crate::errors::{MemberKind, MetaError, Result};
use crate::host::FieldHandle;
use serde::Serialize;

/// Snapshot of one instance variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    name: String,
    offset: isize,
    type_encoding: String,
    #[serde(rename = "type")]
    ty: EncodedType,
}

impl FieldInfo {
    /// Read a field handle. Fails on a null handle or a field without a name.
    pub fn from_handle(handle: Option<&dyn FieldHandle>) -> Result<Self> {
        let handle = handle.ok_or_else(|| MetaError::null_handle(MemberKind::Field))?;
        let name = handle
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MetaError::invalid(MemberKind::Field, "field has no name"))?;

        let type_encoding = handle.type_encoding().unwrap_or_default().to_string();
        let ty = classify(&type_encoding);

        Ok(Self {
            name: name.to_string(),
            offset: handle.offset(),
            type_encoding,
            ty,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    pub fn type_encoding(&self) -> &str {
        &self.type_encoding
    }

    pub fn ty(&self) -> EncodedType {
        self.ty
    }
}
