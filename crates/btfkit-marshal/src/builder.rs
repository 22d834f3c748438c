//! Public accumulation API.

use btfkit_core::{TypeGraph, TypeId, TypeRef};

use crate::encoder::Encoder;
use crate::{MarshalError, MarshalOptions, Registry};

/// Collects root nodes of a graph and encodes them into a blob.
///
/// Adding a node only gives it an ID. Nodes it references are found by
/// [`marshal`](Self::marshal), which numbers them after all roots in the
/// order a [`walk`](btfkit_core::walk) reaches them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Builder<'g> {
    graph: &'g TypeGraph,
    registry: Registry,
}

impl<'g> Builder<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            registry: Registry::new(),
        }
    }

    /// Builder with `roots` added in order.
    pub fn from_roots(
        graph: &'g TypeGraph,
        roots: impl IntoIterator<Item = TypeRef>,
    ) -> Result<Self, MarshalError> {
        let mut builder = Self::new(graph);
        for r in roots {
            builder.add(r)?;
        }
        Ok(builder)
    }

    /// Add a root and return its ID.
    ///
    /// Adding the same node again returns the same ID. Void is always
    /// [`TypeId::VOID`].
    pub fn add(&mut self, r: TypeRef) -> Result<TypeId, MarshalError> {
        self.registry.register(r)
    }

    /// ID of a root added earlier.
    pub fn id(&self, r: TypeRef) -> Option<TypeId> {
        self.registry.get(r)
    }

    /// Number of roots, void excluded.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    /// Encode all roots and everything they reference, appending the blob
    /// to `buf`.
    ///
    /// Roots keep the IDs returned by [`add`](Self::add). The builder is
    /// left untouched, so repeated calls produce identical bytes.
    pub fn marshal(&self, buf: Vec<u8>, options: &MarshalOptions) -> Result<Vec<u8>, MarshalError> {
        Encoder::new(self.graph, &self.registry, options).encode(buf)
    }
}
