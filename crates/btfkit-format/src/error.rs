//! Errors raised while decoding a blob.

use std::io;

use btfkit_core::TypeId;

/// Blob decode error.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("file too small: {0} bytes (minimum 24)")]
    FileTooSmall(usize),
    #[error("invalid magic: expected 0xeb9f in either byte order")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {expected})", expected = crate::VERSION)]
    UnsupportedVersion(u8),
    #[error("invalid header length: {0}")]
    InvalidHeaderLength(u32),
    #[error("{section} section {start}..{end} exceeds blob of {total} bytes")]
    SectionOutOfBounds {
        section: &'static str,
        start: usize,
        end: usize,
        total: usize,
    },
    #[error("string section must start and end with a NUL byte")]
    InvalidStringTable,
    #[error("truncated record at offset {offset}")]
    Truncated { offset: usize },
    #[error("unknown kind {kind} at offset {offset}")]
    UnknownKind { kind: u8, offset: usize },
    #[error("string offset {0} is out of bounds")]
    InvalidStringOffset(u32),
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidString(u32),
    #[error("type {id} refers to missing type {target}")]
    DanglingType { id: TypeId, target: u32 },
    #[error("decl tag {id} targets an invalid type or component")]
    InvalidDeclTag { id: TypeId },
    #[error("type {id} has invalid linkage {linkage}")]
    InvalidLinkage { id: TypeId, linkage: u32 },
    #[error("type {0} does not exist")]
    UnknownType(TypeId),
    #[error("type {0} is a decl tag, not a type")]
    NotAType(TypeId),
    #[error("no type named {0:?}")]
    NotFound(String),
    #[error("multiple types named {name:?}: {ids:?}")]
    Ambiguous { name: String, ids: Vec<TypeId> },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
