//! Errors raised while building or encoding.

use btfkit_core::{GraphError, TypeId, TypeRef};
use btfkit_format::{MAX_NAME_OFFSET, MAX_TYPE_ID, MAX_VLEN};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("too many types (max {max})", max = MAX_TYPE_ID)]
    TooManyTypes,
    #[error("type {id} has {count} members, parameters or values (max {max})", max = MAX_VLEN)]
    TooManyMembers { id: TypeId, count: usize },
    #[error("string table exceeds {max} bytes", max = MAX_NAME_OFFSET)]
    NameOffsetOverflow,
    #[error("string {0:?} contains a NUL byte")]
    StringContainsNul(String),
    #[error("value {value:#x} of enumerator {name:?} does not fit the 32-bit enum {id}")]
    EnumValueOverflow { id: TypeId, name: String, value: u64 },
    #[error("member {member} of type {id} does not fit a bitfield offset")]
    BitfieldOverflow { id: TypeId, member: usize },
    #[error("integer {id} is {size} bytes wide, too wide to encode")]
    IntTooWide { id: TypeId, size: u32 },
    #[error("func {id} tags parameter {index} but its prototype has {params}")]
    ParamTagOutOfRange { id: TypeId, index: usize, params: usize },
    #[error("type section exceeds {max} bytes", max = u32::MAX)]
    TypeSectionOverflow,
    #[error("type {0} is void outside of slot 0")]
    MisplacedVoid(TypeRef),
    #[error("type {0} has no ID")]
    UnresolvedId(TypeRef),
}
