//! Identifier newtypes.
//!
//! [`TypeRef`] addresses a slot in a [`TypeGraph`](crate::TypeGraph).
//! [`TypeId`] is the dense number a type receives in an encoded blob.
//! They are deliberately distinct: the same node has a fixed `TypeRef` but its
//! `TypeId` depends on the order it was added to a builder.

use std::fmt;

/// Index of a node inside a [`TypeGraph`](crate::TypeGraph).
///
/// Comparing two refs is comparing node identity, not content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TypeRef(u32);

impl TypeRef {
    /// The implicit void node, always slot 0.
    pub const VOID: Self = Self(0);

    /// Create a ref from a raw slot index.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Raw slot index.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type ID in the BTF wire format. ID 0 is void and is never stored.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const VOID: Self = Self(0);

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self.0 == 0
    }

    /// The ref a decoded node with this ID occupies.
    ///
    /// Decoded graphs place the node with ID `n` in slot `n`.
    #[inline]
    pub fn as_type_ref(self) -> TypeRef {
        TypeRef(self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}
