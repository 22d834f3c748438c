//! Arena holding a type graph.
//!
//! Every node lives in a flat slot vector addressed by [`TypeRef`]. Slot 0 is
//! always void. Cycles are built by reserving a slot first and defining it
//! once the nodes that point back at it exist.

use crate::{Type, TypeRef};

/// Error raised when a slot cannot be read or written.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("type {0} does not exist in this graph")]
    UnknownRef(TypeRef),
    #[error("type {0} was reserved but never defined")]
    Undefined(TypeRef),
    #[error("type {0} is already defined")]
    AlreadyDefined(TypeRef),
    #[error("the void slot cannot be redefined")]
    VoidSlot,
}

/// Flat store of type nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeGraph {
    /// `None` marks a reserved slot that has not been defined yet.
    slots: Vec<Option<Type>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Type::Void)],
        }
    }

    /// Append a node and return its ref.
    pub fn add(&mut self, ty: Type) -> TypeRef {
        let r = self.next_ref();
        self.slots.push(Some(ty));
        r
    }

    /// Append an empty slot to be filled by [`define`](Self::define).
    pub fn reserve(&mut self) -> TypeRef {
        let r = self.next_ref();
        self.slots.push(None);
        r
    }

    /// Fill a slot returned by [`reserve`](Self::reserve).
    pub fn define(&mut self, r: TypeRef, ty: Type) -> Result<(), GraphError> {
        if r.is_void() {
            return Err(GraphError::VoidSlot);
        }
        let slot = self
            .slots
            .get_mut(r.index())
            .ok_or(GraphError::UnknownRef(r))?;
        if slot.is_some() {
            return Err(GraphError::AlreadyDefined(r));
        }
        *slot = Some(ty);
        Ok(())
    }

    /// Look up a node. `None` for unknown or undefined slots.
    #[inline]
    pub fn get(&self, r: TypeRef) -> Option<&Type> {
        self.slots.get(r.index()).and_then(Option::as_ref)
    }

    /// Look up a node, reporting why it is missing.
    pub fn resolve(&self, r: TypeRef) -> Result<&Type, GraphError> {
        match self.slots.get(r.index()) {
            Some(Some(ty)) => Ok(ty),
            Some(None) => Err(GraphError::Undefined(r)),
            None => Err(GraphError::UnknownRef(r)),
        }
    }

    /// Number of slots besides void, defined or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// Whether the graph holds nothing but void.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over defined nodes, void first.
    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &Type)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|ty| (TypeRef::from_raw(i as u32), ty)))
    }

    fn next_ref(&self) -> TypeRef {
        TypeRef::from_raw(self.slots.len() as u32)
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}
