//! Cycle tolerant traversal of a type graph.
//!
//! [`walk`] yields every node reachable from a set of roots exactly once, in
//! preorder: a node comes before the nodes it references, and references are
//! followed in field order. The visited set is owned by the caller so several
//! walks can share it, and so a walk can be abandoned early and resumed
//! later without yielding anything twice.

use std::collections::HashSet;
use std::iter::FusedIterator;

use crate::{GraphError, TypeGraph, TypeRef};

/// Start a walk from `roots`, skipping everything already in `visited`.
///
/// Roots are visited in the order given. Void is never yielded.
pub fn walk<'g, 'v>(
    graph: &'g TypeGraph,
    roots: impl IntoIterator<Item = TypeRef>,
    visited: &'v mut HashSet<TypeRef>,
) -> Walk<'g, 'v> {
    let mut stack: Vec<TypeRef> = roots.into_iter().collect();
    stack.reverse();
    Walk {
        graph,
        visited,
        stack,
    }
}

/// Lazy preorder traversal, see [`walk`].
///
/// A reference to an undefined or unknown slot yields one error and the walk
/// carries on with the remaining nodes.
#[derive(Debug)]
pub struct Walk<'g, 'v> {
    graph: &'g TypeGraph,
    visited: &'v mut HashSet<TypeRef>,
    /// Pending nodes, top of stack is visited next.
    stack: Vec<TypeRef>,
}

impl Iterator for Walk<'_, '_> {
    type Item = Result<TypeRef, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        while let Some(r) = self.stack.pop() {
            // Marked before descending, so cycles terminate here.
            if r.is_void() || !self.visited.insert(r) {
                continue;
            }

            let ty = match graph.resolve(r) {
                Ok(ty) => ty,
                Err(err) => return Some(Err(err)),
            };

            let start = self.stack.len();
            self.stack.extend(
                ty.references()
                    .into_iter()
                    .filter(|child| !child.is_void() && !self.visited.contains(child)),
            );
            self.stack[start..].reverse();

            return Some(Ok(r));
        }
        None
    }
}

impl FusedIterator for Walk<'_, '_> {}
