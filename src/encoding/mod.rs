//! Type-encoding classification
//!
//! Decodes the compact type-encoding grammar used for fields, method
//! arguments and property declarations into an `EncodedType`: one base
//! category plus orthogonal qualifier and property-attribute bit sets.
//!
//! This is a fixed-priority character classifier, not a grammar engine.
//! Qualifier markers are folded in any order, then a single base marker (with
//! one character of lookahead for blocks) picks the category. Nested struct,
//! union, array and pointer contents are never decomposed.

pub mod attributes;

pub use attributes::{parse_object_type, split_attributes, ObjectType, PropertyAttribute};

use crate::errors::{MetaError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base category of an encoded type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncodingKind {
    Unknown = 0,
    Void = 1,
    Bool = 2,
    Int8 = 3,
    UInt8 = 4,
    Int16 = 5,
    UInt16 = 6,
    Int32 = 7,
    UInt32 = 8,
    Int64 = 9,
    UInt64 = 10,
    Float = 11,
    Double = 12,
    LongDouble = 13,
    Object = 14,
    Class = 15,
    Selector = 16,
    Block = 17,
    Pointer = 18,
    Struct = 19,
    Union = 20,
    CString = 21,
    CArray = 22,
}

impl EncodingKind {
    const ALL: [EncodingKind; 23] = [
        Self::Unknown,
        Self::Void,
        Self::Bool,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::LongDouble,
        Self::Object,
        Self::Class,
        Self::Selector,
        Self::Block,
        Self::Pointer,
        Self::Struct,
        Self::Union,
        Self::CString,
        Self::CArray,
    ];

    /// Category for a base marker character. `next` is the character after
    /// the marker, consulted only to tell blocks (`@?`) from objects (`@`).
    pub fn from_marker(marker: u8, next: Option<u8>) -> Self {
        match marker {
            b'v' => Self::Void,
            b'B' => Self::Bool,
            b'c' => Self::Int8,
            b'C' => Self::UInt8,
            b's' => Self::Int16,
            b'S' => Self::UInt16,
            b'i' | b'l' => Self::Int32,
            b'I' | b'L' => Self::UInt32,
            b'q' => Self::Int64,
            b'Q' => Self::UInt64,
            b'f' => Self::Float,
            b'd' => Self::Double,
            b'D' => Self::LongDouble,
            b'#' => Self::Class,
            b':' => Self::Selector,
            b'*' => Self::CString,
            b'^' => Self::Pointer,
            b'[' => Self::CArray,
            b'(' => Self::Union,
            b'{' => Self::Struct,
            b'@' if next == Some(b'?') => Self::Block,
            b'@' => Self::Object,
            _ => Self::Unknown,
        }
    }

    pub fn from_repr(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Plain C integer or floating point scalar (including bool)
    pub const fn is_c_number(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
                | Self::LongDouble
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::Object => "object",
            Self::Class => "class",
            Self::Selector => "selector",
            Self::Block => "block",
            Self::Pointer => "pointer",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::CString => "c string",
            Self::CArray => "c array",
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Type qualifiers that may prefix an encoding
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Qualifiers: u8 {
        const CONST  = 1 << 0;
        const IN     = 1 << 1;
        const INOUT  = 1 << 2;
        const OUT    = 1 << 3;
        const BYCOPY = 1 << 4;
        const BYREF  = 1 << 5;
        const ONEWAY = 1 << 6;
    }
}

impl Qualifiers {
    pub fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            b'r' => Some(Self::CONST),
            b'n' => Some(Self::IN),
            b'N' => Some(Self::INOUT),
            b'o' => Some(Self::OUT),
            b'O' => Some(Self::BYCOPY),
            b'R' => Some(Self::BYREF),
            b'V' => Some(Self::ONEWAY),
            _ => None,
        }
    }
}

bitflags! {
    /// Declaration attributes of a property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PropertyAttributes: u8 {
        const READONLY      = 1 << 0;
        const COPY          = 1 << 1;
        const RETAIN        = 1 << 2;
        const NONATOMIC     = 1 << 3;
        const WEAK          = 1 << 4;
        const CUSTOM_GETTER = 1 << 5;
        const CUSTOM_SETTER = 1 << 6;
        const DYNAMIC       = 1 << 7;
    }
}

impl PropertyAttributes {
    /// Flag for a value-less attribute code. `G` and `S` carry a selector
    /// name and are handled by the property extractor.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'R' => Some(Self::READONLY),
            'C' => Some(Self::COPY),
            '&' => Some(Self::RETAIN),
            'N' => Some(Self::NONATOMIC),
            'W' => Some(Self::WEAK),
            'D' => Some(Self::DYNAMIC),
            _ => None,
        }
    }
}

/// Packed-layout masks, matching the host convention of one machine word
/// holding category, qualifiers and property attributes.
pub const KIND_MASK: u32 = 0xFF;
pub const QUALIFIER_MASK: u32 = 0xFF00;
pub const PROPERTY_MASK: u32 = 0xFF_0000;

/// Classified type encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedType {
    pub kind: EncodingKind,
    pub qualifiers: Qualifiers,
    pub attributes: PropertyAttributes,
}

impl EncodedType {
    pub const UNKNOWN: Self = Self {
        kind: EncodingKind::Unknown,
        qualifiers: Qualifiers::empty(),
        attributes: PropertyAttributes::empty(),
    };

    pub const fn new(kind: EncodingKind) -> Self {
        Self {
            kind,
            qualifiers: Qualifiers::empty(),
            attributes: PropertyAttributes::empty(),
        }
    }

    pub fn with_attributes(mut self, attributes: PropertyAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == EncodingKind::Unknown
    }

    /// Pack into a single word: kind in bits 0..8, qualifiers in 8..16,
    /// property attributes in 16..24
    pub fn bits(&self) -> u32 {
        (self.kind as u32)
            | (u32::from(self.qualifiers.bits()) << 8)
            | (u32::from(self.attributes.bits()) << 16)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self {
            kind: EncodingKind::from_repr((bits & KIND_MASK) as u8).unwrap_or(EncodingKind::Unknown),
            qualifiers: Qualifiers::from_bits_truncate(((bits & QUALIFIER_MASK) >> 8) as u8),
            attributes: PropertyAttributes::from_bits_truncate(((bits & PROPERTY_MASK) >> 16) as u8),
        }
    }
}

impl Default for EncodedType {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Classify a type-encoding string.
///
/// Total: empty input, qualifiers with nothing after them and unrecognized
/// base markers all yield `EncodedType::UNKNOWN`, qualifier bits included.
pub fn classify(encoding: &str) -> EncodedType {
    try_classify(encoding).unwrap_or(EncodedType::UNKNOWN)
}

/// Like [`classify`], but reports why a string did not classify
pub fn try_classify(encoding: &str) -> Result<EncodedType> {
    let bytes = encoding.as_bytes();
    let malformed = || MetaError::MalformedEncoding {
        encoding: encoding.to_string(),
    };

    let mut qualifiers = Qualifiers::empty();
    let mut pos = 0;
    while let Some(q) = bytes.get(pos).copied().and_then(Qualifiers::from_marker) {
        qualifiers |= q;
        pos += 1;
    }

    let marker = *bytes.get(pos).ok_or_else(malformed)?;

    match EncodingKind::from_marker(marker, bytes.get(pos + 1).copied()) {
        EncodingKind::Unknown => Err(malformed()),
        kind => Ok(EncodedType {
            kind,
            qualifiers,
            attributes: PropertyAttributes::empty(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(classify("v").kind, EncodingKind::Void);
        assert_eq!(classify("B").kind, EncodingKind::Bool);
        assert_eq!(classify("c").kind, EncodingKind::Int8);
        assert_eq!(classify("l").kind, EncodingKind::Int32);
        assert_eq!(classify("L").kind, EncodingKind::UInt32);
        assert_eq!(classify("Q").kind, EncodingKind::UInt64);
        assert_eq!(classify("D").kind, EncodingKind::LongDouble);
        assert_eq!(classify("*").kind, EncodingKind::CString);
        assert_eq!(classify(":").kind, EncodingKind::Selector);
        assert_eq!(classify("#").kind, EncodingKind::Class);
    }

    #[test]
    fn test_aggregates_by_leading_marker() {
        assert_eq!(classify("^{CGPoint=dd}").kind, EncodingKind::Pointer);
        assert_eq!(classify("{CGPoint=dd}").kind, EncodingKind::Struct);
        assert_eq!(classify("(u=if)").kind, EncodingKind::Union);
        assert_eq!(classify("[10c]").kind, EncodingKind::CArray);
    }

    #[test]
    fn test_object_and_block() {
        assert_eq!(classify("@").kind, EncodingKind::Object);
        assert_eq!(classify("@\"NSString\"").kind, EncodingKind::Object);
        assert_eq!(classify("@?").kind, EncodingKind::Block);
        assert_eq!(classify("@?<v@?>").kind, EncodingKind::Block);
    }

    #[test]
    fn test_qualifiers_fold() {
        let ty = classify("rN@");
        assert_eq!(ty.kind, EncodingKind::Object);
        assert_eq!(ty.qualifiers, Qualifiers::CONST | Qualifiers::INOUT);
        assert_eq!(ty, classify("Nr@"));

        let ty = classify("r^{CGRect={CGPoint=dd}{CGSize=dd}}");
        assert_eq!(ty.kind, EncodingKind::Pointer);
        assert!(ty.qualifiers.contains(Qualifiers::CONST));
    }

    #[test]
    fn test_malformed_is_unknown_without_qualifiers() {
        assert_eq!(classify(""), EncodedType::UNKNOWN);
        assert_eq!(classify("rn"), EncodedType::UNKNOWN);
        assert_eq!(classify("rz"), EncodedType::UNKNOWN);
        assert_eq!(classify("?"), EncodedType::UNKNOWN);
    }

    #[test]
    fn test_bits_layout() {
        let ty = classify("r^v").with_attributes(PropertyAttributes::READONLY);
        assert_eq!(ty.bits() & KIND_MASK, 18);
        assert_eq!(ty.bits() & QUALIFIER_MASK, 1 << 8);
        assert_eq!(ty.bits() & PROPERTY_MASK, 1 << 16);
        assert_eq!(EncodedType::from_bits(ty.bits()), ty);

        assert_eq!(PropertyAttributes::DYNAMIC.bits() as u32, (1 << 23) >> 16);
        assert_eq!(Qualifiers::ONEWAY.bits() as u32, (1 << 14) >> 8);
    }

    #[test]
    fn test_c_number() {
        assert!(classify("d").kind.is_c_number());
        assert!(!classify("@").kind.is_c_number());
        assert!(!classify("*").kind.is_c_number());
    }

    #[test]
    fn test_try_classify_reports_malformed() {
        assert_eq!(try_classify("Nr@").unwrap().kind, EncodingKind::Object);
        assert_eq!(
            try_classify("rz"),
            Err(MetaError::MalformedEncoding {
                encoding: "rz".to_string()
            })
        );
        assert!(try_classify("").is_err());
    }
}
