use crate::core::{EntryPoint, Selector};
use crate::encoding::{classify, EncodedType};
use crate::errors::{MemberKind, MetaError, Result};
use crate::host::MethodHandle;
use serde::Serialize;

/// Snapshot of one method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    name: String,
    selector: Selector,
    entry_point: EntryPoint,
    type_encoding: String,
    return_type_encoding: String,
    argument_type_encodings: Vec<String>,
}

impl MethodInfo {
    /// Read a method handle.
    ///
    /// Argument encodings come from the host's positional accessors. The
    /// combined encoding may hold nested aggregates, so it is never split here.
    pub fn from_handle(handle: Option<&dyn MethodHandle>) -> Result<Self> {
        let handle = handle.ok_or_else(|| MetaError::null_handle(MemberKind::Method))?;
        let name = handle
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MetaError::invalid(MemberKind::Method, "method has no name"))?;
        let entry_point = handle
            .entry_point()
            .ok_or_else(|| MetaError::invalid(MemberKind::Method, format!("{name} has no entry point")))?;

        let argument_type_encodings = (0..handle.argument_count())
            .map(|index| {
                handle.argument_type(index).ok_or_else(|| {
                    MetaError::invalid(MemberKind::Method, format!("{name}: argument {index} not reported"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            selector: handle.selector().unwrap_or_else(|| Selector::register(name)),
            entry_point,
            type_encoding: handle.type_encoding().unwrap_or_default().to_string(),
            return_type_encoding: handle.return_type_encoding().unwrap_or_default(),
            argument_type_encodings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    pub fn type_encoding(&self) -> &str {
        &self.type_encoding
    }

    pub fn return_type_encoding(&self) -> &str {
        &self.return_type_encoding
    }

    pub fn argument_type_encodings(&self) -> &[String] {
        &self.argument_type_encodings
    }

    pub fn return_type(&self) -> EncodedType {
        classify(&self.return_type_encoding)
    }

    pub fn argument_types(&self) -> impl Iterator<Item = EncodedType> + '_ {
        self.argument_type_encodings.iter().map(|enc| classify(enc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingKind;
    use crate::host::MemoryMethod;

    /// Host method without a selector that may hide one argument
    struct Partial {
        missing: Option<usize>,
    }

    impl MethodHandle for Partial {
        fn name(&self) -> Option<&str> {
            Some("broken:")
        }
        fn selector(&self) -> Option<Selector> {
            None
        }
        fn entry_point(&self) -> Option<EntryPoint> {
            Some(EntryPoint(0x40))
        }
        fn type_encoding(&self) -> Option<&str> {
            Some("v@:@")
        }
        fn return_type_encoding(&self) -> Option<String> {
            Some("v".to_string())
        }
        fn argument_count(&self) -> usize {
            3
        }
        fn argument_type(&self, index: usize) -> Option<String> {
            (self.missing != Some(index)).then(|| "@".to_string())
        }
    }

    #[test]
    fn test_nested_arguments_kept_whole() {
        let handle = MemoryMethod::new("moveTo:", "v", &["@", ":", "{CGRect={CGPoint=dd}{CGSize=dd}}"])
            .with_entry_point(EntryPoint(0x10));
        let info = MethodInfo::from_handle(Some(&handle)).unwrap();

        assert_eq!(info.name(), "moveTo:");
        assert_eq!(info.selector(), Selector::register("moveTo:"));
        assert_eq!(info.argument_type_encodings().len(), 3);
        assert_eq!(info.argument_type_encodings()[2], "{CGRect={CGPoint=dd}{CGSize=dd}}");
        assert_eq!(info.return_type().kind, EncodingKind::Void);
        let kinds: Vec<_> = info.argument_types().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![EncodingKind::Object, EncodingKind::Selector, EncodingKind::Struct]);
    }

    #[test]
    fn test_no_arguments() {
        let handle = MemoryMethod::new("hash", "Q", &[]).with_entry_point(EntryPoint(0x20));
        let info = MethodInfo::from_handle(Some(&handle)).unwrap();
        assert!(info.argument_type_encodings().is_empty());
        assert_eq!(info.type_encoding(), "Q");
    }

    #[test]
    fn test_missing_entry_point() {
        let handle = MemoryMethod::new("orphan", "v", &[]);
        assert!(MethodInfo::from_handle(Some(&handle)).is_err());
    }

    #[test]
    fn test_unreported_argument_fails_whole_method() {
        let handle = Partial { missing: Some(1) };
        let err = MethodInfo::from_handle(Some(&handle)).unwrap_err();
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn test_selector_derived_from_name() {
        let handle = Partial { missing: None };
        let info = MethodInfo::from_handle(Some(&handle)).unwrap();
        assert_eq!(info.selector(), Selector::register("broken:"));
        assert_eq!(info.entry_point(), EntryPoint(0x40));
        assert!(MethodInfo::from_handle(None).is_err());
    }
}
