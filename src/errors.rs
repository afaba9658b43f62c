//! Error types for metadata extraction
//!
//! Nothing here is fatal to a cache build: a member that fails to construct is
//! dropped and the rest of the type is still extracted. `TypeNotFound` and
//! `MalformedEncoding` exist so callers that want a reason can get one, but the
//! public lookup paths surface them as `None` and `EncodingKind::Unknown`.

use std::fmt;
use thiserror::Error;

/// Which kind of member a handle described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Property,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Method => write!(f, "method"),
            Self::Property => write!(f, "property"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    #[error("invalid {member} handle: {reason}")]
    InvalidHandle { member: MemberKind, reason: String },

    #[error("type not found: {name}")]
    TypeNotFound { name: String },

    #[error("malformed type encoding: {encoding:?}")]
    MalformedEncoding { encoding: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("a reflection host is already installed for the global cache")]
    HostAlreadyInstalled,
}

impl MetaError {
    pub fn null_handle(member: MemberKind) -> Self {
        Self::InvalidHandle {
            member,
            reason: "handle is null".to_string(),
        }
    }

    pub fn invalid(member: MemberKind, reason: impl Into<String>) -> Self {
        Self::InvalidHandle {
            member,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MetaError>;
