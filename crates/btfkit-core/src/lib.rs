#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for BTF type graphs.
//!
//! Two layers:
//! - **Model**: the [`Type`] sum type, one payload shape per BTF kind
//! - **Graph**: an index-based arena ([`TypeGraph`]) and a cycle tolerant
//!   [`walk`] over the references between its nodes
//!
//! Nodes never own each other. References are [`TypeRef`] slot indices, so
//! shared, self-referential and mutually recursive types need no special
//! handling.

mod graph;
mod ids;
mod types;
mod walk;


pub use graph::{GraphError, TypeGraph};
pub use ids::{TypeId, TypeRef};
pub use types::{
    Array, Composite, Datasec, Enum, EnumValue, Float, FuncLinkage, Func, FuncParam, FuncProto,
    Fwd, FwdKind, Int, IntEncoding, Member, Pointer, Qualifier, Type, TypeTag, Typedef, Var,
    VarLinkage, VarSecinfo,
};
pub use walk::{Walk, walk};
