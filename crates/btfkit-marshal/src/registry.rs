//! Node identity to type ID mapping.

use btfkit_core::{TypeId, TypeRef};
use btfkit_format::MAX_TYPE_ID;
use indexmap::IndexMap;

use crate::MarshalError;

/// Assigns dense type IDs to graph nodes.
///
/// Identity is the [`TypeRef`]: the same slot always gets the same ID, and
/// two slots with equal content get two IDs. Registering never looks at the
/// node itself, so cyclic nodes need no special care.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    ids: IndexMap<TypeRef, TypeId>,
    /// Highest ID handed out, including anonymous reservations.
    last: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID of `r`, allocating the next one if `r` is new.
    ///
    /// Void is always [`TypeId::VOID`] and is not recorded.
    pub fn register(&mut self, r: TypeRef) -> Result<TypeId, MarshalError> {
        if r.is_void() {
            return Ok(TypeId::VOID);
        }
        if let Some(&id) = self.ids.get(&r) {
            return Ok(id);
        }
        let id = self.reserve()?;
        self.ids.insert(r, id);
        Ok(id)
    }

    /// Allocate an ID that belongs to no graph node.
    pub fn reserve(&mut self) -> Result<TypeId, MarshalError> {
        if self.last >= MAX_TYPE_ID {
            return Err(MarshalError::TooManyTypes);
        }
        self.last += 1;
        Ok(TypeId(self.last))
    }

    pub fn get(&self, r: TypeRef) -> Option<TypeId> {
        if r.is_void() {
            return Some(TypeId::VOID);
        }
        self.ids.get(&r).copied()
    }

    pub fn contains(&self, r: TypeRef) -> bool {
        r.is_void() || self.ids.contains_key(&r)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Registered nodes in registration order.
    pub fn refs(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.ids.keys().copied()
    }

    pub fn last_id(&self) -> TypeId {
        TypeId(self.last)
    }
}
